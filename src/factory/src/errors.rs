use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum FactoryError {
    AlreadyInitialized = 300,
    NotInitialized = 301,
    IdenticalAddresses = 302,
    ZeroAddress = 303,
    PairExists = 304,
    NotPauser = 305,
    NotPendingPauser = 306,
    PairNotFound = 307,
}
