use soroban_sdk::{contractevent, Address};

#[contractevent]
pub struct PairCreated {
    #[topic]
    pub token_0: Address,
    #[topic]
    pub token_1: Address,
    pub stable: bool,
    pub pair: Address,
    pub concentrated_pair: Address,
    pub index: u32,
}

#[contractevent]
pub struct PauseSet {
    pub paused: bool,
}

#[contractevent]
pub struct PauserProposed {
    #[topic]
    pub pauser: Address,
}

#[contractevent]
pub struct PauserAccepted {
    #[topic]
    pub pauser: Address,
}
