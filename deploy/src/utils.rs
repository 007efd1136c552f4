use anyhow::{anyhow, Context, Result};
use ethers::{signers::LocalWallet, utils::hex};

pub fn strip_hex_prefix(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    hex::decode(strip_hex_prefix(s)).with_context(|| "invalid hex string")
}

pub fn wallet_from_hex(sk: &str) -> Result<LocalWallet> {
    let bytes = decode_hex(sk).with_context(|| "private key format error")?;
    if bytes.len() != 32 {
        return Err(anyhow!(
            "private key must be 32 bytes, got {} bytes",
            bytes.len()
        ));
    }
    Ok(LocalWallet::from_bytes(&bytes)?)
}
