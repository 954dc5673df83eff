use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum PairError {
    AlreadyInitialized = 100,
    ZeroAddress = 101,
    IdenticalTokens = 102,
    InsufficientLiquidityMinted = 103,
    InsufficientLiquidityBurned = 104,
    InsufficientOutputAmount = 105,
    InsufficientLiquidity = 106,
    InvalidAmount = 107,
    KInvariant = 108,
    InsufficientInputAmount = 109,
    Reentrant = 110,
    Expired = 111,
    InvalidSignature = 112,
    FeeTooHigh = 113,
    NotInitialized = 114,
    InvalidTo = 115,
    NotFactory = 116,
    Paused = 117,
    NotConverged = 118,
    Overflow = 119,
    InsufficientBalance = 120,
    InsufficientAllowance = 121,
    InsufficientObservations = 122,
    ObservationUnavailable = 123,
    InvalidToken = 124,
}
