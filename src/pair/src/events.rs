use soroban_sdk::{contractevent, Address};

#[contractevent]
pub struct Mint {
    #[topic]
    pub to: Address,
    pub amount_0: i128,
    pub amount_1: i128,
    pub liquidity: i128,
}

#[contractevent]
pub struct Burn {
    #[topic]
    pub to: Address,
    pub amount_0: i128,
    pub amount_1: i128,
    pub liquidity: i128,
}

#[contractevent]
pub struct Swap {
    #[topic]
    pub to: Address,
    pub amount_0_in: i128,
    pub amount_1_in: i128,
    pub amount_0_out: i128,
    pub amount_1_out: i128,
}

#[contractevent]
pub struct Sync {
    pub reserve_0: i128,
    pub reserve_1: i128,
}

#[contractevent]
pub struct Fees {
    pub amount_0: i128,
    pub amount_1: i128,
}

#[contractevent]
pub struct Transfer {
    #[topic]
    pub from: Address,
    #[topic]
    pub to: Address,
    pub amount: i128,
}

#[contractevent]
pub struct Approval {
    #[topic]
    pub owner: Address,
    #[topic]
    pub spender: Address,
    pub amount: i128,
}

#[contractevent]
pub struct SwapFeeUpdated {
    pub swap_fee_bps: u32,
}

#[contractevent]
pub struct ConcentratedToggled {
    pub enabled: bool,
    pub price: i128,
}

#[contractevent]
pub struct Rebalance {
    pub zero_for_one: bool,
    pub amount_in: i128,
    pub amount_out: i128,
    pub price: i128,
}
