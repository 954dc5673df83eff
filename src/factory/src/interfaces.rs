use soroban_sdk::{contractclient, Address, Env};

#[contractclient(name = "PairClient")]
pub trait PairInterface {
    fn initialize(
        env: Env,
        factory: Address,
        token_a: Address,
        token_b: Address,
        stable: bool,
        concentrated_pair: Address,
    );
    fn set_swap_fee(env: Env, caller: Address, swap_fee_bps: u32);
    fn set_concentrated_enabled(env: Env, caller: Address, enabled: bool);
}
