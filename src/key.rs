use anyhow::{Context, Result, bail};
use std::io::{self, IsTerminal};
use zeroize::Zeroizing;

pub fn read_key(arg: Option<String>) -> Result<Zeroizing<Vec<u8>>> {
    //  Flag or environment variable
    //  AESDUO_KEY="000102...1f" aesduo encrypt A128CBC-HS256 --input msg.txt
    if let Some(hex_key) = arg.map(Zeroizing::new) {
        if !hex_key.trim().is_empty() {
            return decode_key(&hex_key);
        }
    }

    //  Interactive (TTY)
    if io::stdin().is_terminal() {
        let entered = Zeroizing::new(rpassword::prompt_password("Key (hex): ")?);
        if !entered.trim().is_empty() {
            return decode_key(&entered);
        }
    }

    bail!("No key provided; pass --key or set AESDUO_KEY")
}

fn decode_key(hex_key: &str) -> Result<Zeroizing<Vec<u8>>> {
    hex::decode(hex_key.trim())
        .map(Zeroizing::new)
        .context("key is not valid hex")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_hex_argument() {
        let key = read_key(Some(" 00ff10 \n".to_string())).unwrap();
        assert_eq!(key.as_slice(), &[0x00, 0xff, 0x10]);
    }

    #[test]
    fn rejects_non_hex_argument() {
        let err = read_key(Some("zz".to_string())).unwrap_err();
        assert!(err.to_string().contains("not valid hex"));
    }
}
