/// The first mainnet block of the London era (EIP-1559, adds `baseFeePerGas`).
pub const LONDON_START: u64 = 12_965_000;

/// The first mainnet block of the Paris era (the merge, no new header fields).
pub const PARIS_START: u64 = 15_537_394;

/// The first mainnet block of the Shanghai era (adds `withdrawalsRoot`).
pub const SHANGHAI_START: u64 = 17_034_870;

/// The first mainnet block of the Cancun era (adds `blobGasUsed`,
/// `excessBlobGas` and `parentBeaconBlockRoot`).
pub const CANCUN_START: u64 = 19_426_587;

/// The first mainnet block of the Prague era (adds `requestsHash`).
pub const PRAGUE_START: u64 = 22_431_084;

/// Number of fields every header carries, from `parentHash` to `nonce`.
pub const LEGACY_FIELD_COUNT: usize = 15;

/// Header fork era on mainnet, used to sanity check the shape of a header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeaderEra {
    GenesisToLondon,
    LondonToShanghai,
    ShanghaiToCancun,
    CancunToPrague,
    Prague,
}

impl HeaderEra {
    /// Returns the era a mainnet block number belongs to.
    pub fn for_mainnet_block(number: u64) -> Self {
        if number >= PRAGUE_START {
            Self::Prague
        } else if number >= CANCUN_START {
            Self::CancunToPrague
        } else if number >= SHANGHAI_START {
            Self::ShanghaiToCancun
        } else if number >= LONDON_START {
            Self::LondonToShanghai
        } else {
            Self::GenesisToLondon
        }
    }

    /// Number of RLP fields a header of this era encodes.
    pub fn field_count(self) -> usize {
        match self {
            Self::GenesisToLondon => LEGACY_FIELD_COUNT,
            Self::LondonToShanghai => LEGACY_FIELD_COUNT + 1,
            Self::ShanghaiToCancun => LEGACY_FIELD_COUNT + 2,
            Self::CancunToPrague => LEGACY_FIELD_COUNT + 5,
            Self::Prague => LEGACY_FIELD_COUNT + 6,
        }
    }
}
