use soroban_sdk::contractevent;

#[contractevent]
pub struct PriceUpdated {
    pub price: i128,
}

#[contractevent]
pub struct Enabled {
    pub price: i128,
    pub reserve_0: i128,
    pub reserve_1: i128,
}

#[contractevent]
pub struct Disabled {
    pub amount_0: i128,
    pub amount_1: i128,
}
