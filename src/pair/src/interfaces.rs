//! Contracts the pair talks to. Only the calls the pair makes are declared.

use soroban_sdk::{contractclient, Address, Bytes, Env};

#[contractclient(name = "FactoryClient")]
pub trait FactoryInterface {
    fn is_paused(env: Env) -> bool;
}

/// Implemented by flash-swap borrowers.
#[contractclient(name = "SwapCalleeClient")]
pub trait SwapCallee {
    fn hook(env: Env, pair: Address, amount_0_out: i128, amount_1_out: i128, data: Bytes);
}

#[contractclient(name = "ConcentratedPairClient")]
pub trait ConcentratedPairInterface {
    fn initialize(env: Env, pair: Address, token_0: Address, token_1: Address);
    fn set_price(env: Env, caller: Address, price: i128);
    fn set_enabled(env: Env, caller: Address, enabled: bool, price: i128);
    fn withdraw(env: Env, caller: Address, to: Address, amount_0: i128, amount_1: i128);
    fn sync(env: Env, caller: Address);
    fn price(env: Env) -> i128;
    fn enabled(env: Env) -> bool;
    fn get_reserves(env: Env) -> (i128, i128);
    fn get_amount_out(env: Env, amount_in: i128, token_in: Address) -> (i128, i128);
    fn get_amount_in(env: Env, amount_0_out: i128, amount_1_out: i128) -> (i128, i128, i128, i128);
}
