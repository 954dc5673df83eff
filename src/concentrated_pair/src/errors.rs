use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ConcentratedError {
    AlreadyInitialized = 200,
    NotInitialized = 201,
    NotPair = 202,
    InvalidToken = 203,
    InvalidAmount = 204,
    InvalidPrice = 205,
    Disabled = 206,
    InsufficientLiquidity = 207,
    Overflow = 208,
}
