use std::fmt;
use std::str::FromStr;

use ethereum_types::U256;

use super::errors::ProofError;

/// A storage slot identifier, as given by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotKey {
    /// `0x`-prefixed hex, forwarded to the endpoint as written.
    Hex(String),
    Int(U256),
}

impl SlotKey {
    /// Parses `0x` hex (at most 32 bytes) or a decimal integer below 2^256.
    pub fn parse(value: &str) -> Result<Self, ProofError> {
        let value = value.trim();
        if let Some(digits) = value.strip_prefix("0x") {
            if digits.is_empty() || digits.len() > 64 {
                return Err(ProofError::InvalidRequest(format!(
                    "slot `{}` must have between 1 and 64 hex digits",
                    value
                )));
            }
            if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ProofError::InvalidRequest(format!(
                    "slot `{}` is not valid hex",
                    value
                )));
            }
            return Ok(SlotKey::Hex(value.to_string()));
        }
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(ProofError::InvalidRequest(format!(
                "slot `{}` is neither hex nor decimal",
                value
            )));
        }
        U256::from_dec_str(value)
            .map(SlotKey::Int)
            .map_err(|e| ProofError::InvalidRequest(format!("slot `{}`: {:?}", value, e)))
    }

    /// The hex-quantity string sent in `eth_getProof`.
    pub fn to_rpc_param(&self) -> String {
        match self {
            SlotKey::Hex(value) => value.clone(),
            SlotKey::Int(value) => format!("0x{:x}", value),
        }
    }
}

impl From<u64> for SlotKey {
    fn from(value: u64) -> Self {
        SlotKey::Int(U256::from(value))
    }
}

impl From<U256> for SlotKey {
    fn from(value: U256) -> Self {
        SlotKey::Int(value)
    }
}

impl FromStr for SlotKey {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SlotKey::parse(s)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rpc_param())
    }
}

/// Checks the `0x` + 40 hex digit shape and lower-cases the address.
pub fn normalize_address(address: &str) -> Result<String, ProofError> {
    let address = address.trim();
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| ProofError::InvalidRequest(format!("address `{}` lacks 0x", address)))?;
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ProofError::InvalidRequest(format!(
            "address `{}` must be 40 hex digits",
            address
        )));
    }
    Ok(format!("0x{}", digits.to_ascii_lowercase()))
}

/// One account whose proof goes into the bundle, with the storage slots to
/// prove under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofTarget {
    address: String,
    slots: Vec<SlotKey>,
}

impl ProofTarget {
    pub fn new(address: &str, slots: Vec<SlotKey>) -> Result<Self, ProofError> {
        Ok(Self {
            address: normalize_address(address)?,
            slots,
        })
    }

    /// Lower-cased `0x` address.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn slots(&self) -> &[SlotKey] {
        &self.slots
    }

    pub fn storage_keys(&self) -> Vec<String> {
        self.slots.iter().map(SlotKey::to_rpc_param).collect()
    }
}

/// `ADDRESS` or `ADDRESS:SLOT,SLOT,...`.
impl FromStr for ProofTarget {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, slots) = match s.split_once(':') {
            Some((address, slots)) => (address, slots),
            None => (s, ""),
        };
        let slots = slots
            .split(',')
            .filter(|slot| !slot.trim().is_empty())
            .map(SlotKey::parse)
            .collect::<Result<Vec<_>, _>>()?;
        ProofTarget::new(address, slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_normalization() {
        assert_eq!(SlotKey::parse("0").unwrap().to_rpc_param(), "0x0");
        assert_eq!(SlotKey::parse("15").unwrap().to_rpc_param(), "0xf");
        assert_eq!(SlotKey::from(2u64).to_rpc_param(), "0x2");
        assert_eq!(SlotKey::parse("0x00f").unwrap().to_rpc_param(), "0x00f");

        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        assert_eq!(
            SlotKey::parse(max).unwrap().to_rpc_param(),
            format!("0x{}", "f".repeat(64))
        );
    }

    #[test]
    fn test_slot_rejects_garbage() {
        assert!(SlotKey::parse("").is_err());
        assert!(SlotKey::parse("0x").is_err());
        assert!(SlotKey::parse("0xzz").is_err());
        assert!(SlotKey::parse("-1").is_err());
        assert!(SlotKey::parse(&format!("0x1{}", "0".repeat(64))).is_err());
        assert!(SlotKey::parse(
            "115792089237316195423570985008687907853269984665640564039457584007913129639936"
        )
        .is_err());
    }

    #[test]
    fn test_address_is_lowercased() {
        assert_eq!(
            normalize_address("0x6B175474E89094C44Da98b954EedeAC495271d0F").unwrap(),
            "0x6b175474e89094c44da98b954eedeac495271d0f"
        );
        assert!(normalize_address("6b175474e89094c44da98b954eedeac495271d0f").is_err());
        assert!(normalize_address("0x6b175474").is_err());
    }

    #[test]
    fn test_target_from_str() {
        let target: ProofTarget = "0xDC24316b9AE028F1497c275EB9192a3Ea0f67022:0,1,0x2"
            .parse()
            .unwrap();
        assert_eq!(target.address(), "0xdc24316b9ae028f1497c275eb9192a3ea0f67022");
        assert_eq!(target.storage_keys(), vec!["0x0", "0x1", "0x2"]);

        let bare: ProofTarget = "0xdc24316b9ae028f1497c275eb9192a3ea0f67022".parse().unwrap();
        assert!(bare.slots().is_empty());
    }
}
