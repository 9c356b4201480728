use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, Map};

#[contracttype]
#[derive(Clone)]
enum MockQuoteKey {
    Balances,
}

/// Minimal SEP-41 subset: balances only.
#[contract]
pub struct MockQuoteToken;

fn balances(env: &Env) -> Map<Address, i128> {
    env.storage()
        .instance()
        .get(&MockQuoteKey::Balances)
        .unwrap_or_else(|| Map::new(env))
}

#[contractimpl]
impl MockQuoteToken {
    pub fn mint(env: Env, to: Address, amount: i128) {
        let mut balances = balances(&env);
        let prev = balances.get(to.clone()).unwrap_or(0);
        balances.set(to, prev + amount);
        env.storage().instance().set(&MockQuoteKey::Balances, &balances);
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) {
        // no auth: the pool moves quote on behalf of traders
        let mut balances = balances(&env);
        let from_bal = balances.get(from.clone()).unwrap_or(0);
        assert!(from_bal >= amount, "insufficient quote balance");
        balances.set(from, from_bal - amount);
        let to_bal = balances.get(to.clone()).unwrap_or(0);
        balances.set(to, to_bal + amount);
        env.storage().instance().set(&MockQuoteKey::Balances, &balances);
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        balances(&env).get(id).unwrap_or(0)
    }
}
