extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    token, vec, Address, Env, IntoVal, Symbol, TryIntoVal, Val,
};

use crate::events::{
    AccountCreated, CoinCreated, DepositedFunds, FeesCollected, GoalReached, WithdrawedFunds,
};
use crate::{AssetId, VaultChain, VaultChainClient};

const UNIT: i128 = 10_000_000;
const FEE: i128 = 1_000;

fn setup() -> (Env, VaultChainClient<'static>, Address, token::Client<'static>) {
    let env = Env::default();
    env.mock_all_auths();

    let token_admin = Address::generate(&env);
    let native = create_token(&env, &token_admin);
    let admin = Address::generate(&env);

    let contract_id = env.register(VaultChain, ());
    let client = VaultChainClient::new(&env, &contract_id);
    client.init(&admin, &native.address, &FEE);

    let owner = Address::generate(&env);
    token::StellarAssetClient::new(&env, &native.address).mint(&owner, &(100 * UNIT));
    (env, client, owner, native)
}

fn create_token<'a>(env: &Env, admin: &Address) -> token::Client<'a> {
    let addr = env.register_stellar_asset_contract_v2(admin.clone());
    token::Client::new(env, &addr.address())
}

/// Last event published by the vault itself.
fn last_vault_event(env: &Env, client: &VaultChainClient) -> (soroban_sdk::Vec<Val>, Val) {
    let all_events = env.events().all();
    let (_, topics, data) = all_events
        .iter()
        .filter(|(contract, _, _)| contract == &client.address)
        .last()
        .expect("No vault events found");
    (topics, data)
}

fn count_vault_events(env: &Env, client: &VaultChainClient, topic: Symbol) -> usize {
    env.events()
        .all()
        .iter()
        .filter(|(contract, topics, _)| {
            if contract != &client.address {
                return false;
            }
            let first: Option<Symbol> = topics.get(0).and_then(|t| t.try_into_val(env).ok());
            first == Some(topic.clone())
        })
        .count()
}

#[test]
fn test_account_created_event() {
    let (env, client, owner, _) = setup();
    client.create_account(&owner, &UNIT, &(UNIT / 2), &FEE);

    let (topics, data) = last_vault_event(&env, &client);
    let expected_topics = vec![
        &env,
        symbol_short!("created").into_val(&env),
        owner.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: AccountCreated = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        AccountCreated {
            owner: owner.clone()
        }
    );
}

#[test]
fn test_coin_created_event() {
    let (env, client, owner, _) = setup();
    let coin = create_token(&env, &Address::generate(&env));
    client.create_account(&owner, &UNIT, &(UNIT / 2), &FEE);
    client.add_coin(&owner, &coin.address, &(UNIT * 3), &UNIT);

    let (topics, data) = last_vault_event(&env, &client);
    let expected_topics = vec![
        &env,
        symbol_short!("coin_add").into_val(&env),
        owner.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: CoinCreated = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        CoinCreated {
            owner: owner.clone(),
            asset: AssetId::Token(coin.address.clone()),
            goal: UNIT * 3,
            limit: UNIT,
        }
    );
}

#[test]
fn test_deposited_funds_event_without_goal() {
    let (env, client, owner, _) = setup();
    client.create_account(&owner, &UNIT, &(UNIT / 2), &FEE);
    client.deposit(&owner, &AssetId::Native, &(UNIT / 5));

    let (topics, data) = last_vault_event(&env, &client);
    let expected_topics = vec![
        &env,
        symbol_short!("deposit").into_val(&env),
        owner.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: DepositedFunds = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        DepositedFunds {
            owner: owner.clone(),
            asset: AssetId::Native,
            amount: UNIT / 5,
        }
    );
    assert_eq!(count_vault_events(&env, &client, symbol_short!("goal")), 0);
}

#[test]
fn test_goal_reached_event_fires_once() {
    let (env, client, owner, _) = setup();
    client.create_account(&owner, &UNIT, &(UNIT / 2), &FEE);
    client.deposit(&owner, &AssetId::Native, &(UNIT / 5));
    client.deposit(&owner, &AssetId::Native, &(UNIT * 4 / 5));

    let (topics, data) = last_vault_event(&env, &client);
    let expected_topics = vec![
        &env,
        symbol_short!("goal").into_val(&env),
        owner.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: GoalReached = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        GoalReached {
            owner: owner.clone(),
            asset: AssetId::Native,
            funds: UNIT,
        }
    );

    // Deposits past the goal only report the deposit.
    client.deposit(&owner, &AssetId::Native, &UNIT);
    let (topics, data) = last_vault_event(&env, &client);
    let expected_topics = vec![
        &env,
        symbol_short!("deposit").into_val(&env),
        owner.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);
    let event_data: DepositedFunds = data.try_into_val(&env).unwrap();
    assert_eq!(event_data.amount, UNIT);
}

#[test]
fn test_goal_not_renotified_after_dipping_below() {
    let (env, client, owner, _) = setup();
    client.create_account(&owner, &UNIT, &(UNIT / 2), &FEE);
    client.deposit(&owner, &AssetId::Native, &UNIT);
    let (_, data) = last_vault_event(&env, &client);
    let event_data: GoalReached = data.try_into_val(&env).unwrap();
    assert_eq!(event_data.funds, UNIT);

    let below = client.withdraw(&owner, &AssetId::Native, &(UNIT * 3 / 10));
    assert!(below.funds < UNIT);

    // Climbing back past the goal publishes the deposit alone.
    let entry = client.deposit(&owner, &AssetId::Native, &(UNIT / 2));
    assert_eq!(entry.funds, UNIT * 12 / 10);
    assert!(entry.goal_reached);

    let (topics, data) = last_vault_event(&env, &client);
    let expected_topics = vec![
        &env,
        symbol_short!("deposit").into_val(&env),
        owner.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);
    let event_data: DepositedFunds = data.try_into_val(&env).unwrap();
    assert_eq!(event_data.amount, UNIT / 2);
}

#[test]
fn test_goal_reached_on_single_large_deposit() {
    let (env, client, owner, _) = setup();
    client.create_account(&owner, &UNIT, &(UNIT / 2), &FEE);
    client.deposit(&owner, &AssetId::Native, &(UNIT * 5));

    let (_, data) = last_vault_event(&env, &client);
    let event_data: GoalReached = data.try_into_val(&env).unwrap();
    assert_eq!(event_data.funds, UNIT * 5);
}

#[test]
fn test_withdrawed_funds_event() {
    let (env, client, owner, _) = setup();
    client.create_account(&owner, &UNIT, &(UNIT / 2), &FEE);
    client.deposit(&owner, &AssetId::Native, &UNIT);
    client.withdraw(&owner, &AssetId::Native, &(UNIT / 10));

    let (topics, data) = last_vault_event(&env, &client);
    let expected_topics = vec![
        &env,
        symbol_short!("withdraw").into_val(&env),
        owner.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: WithdrawedFunds = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        WithdrawedFunds {
            owner: owner.clone(),
            asset: AssetId::Native,
            amount: UNIT / 10,
        }
    );
}

#[test]
fn test_fees_collected_event() {
    let (env, client, owner, _) = setup();
    client.create_account(&owner, &UNIT, &(UNIT / 2), &FEE);

    let treasury = Address::generate(&env);
    client.collect_fees(&treasury);

    let (topics, data) = last_vault_event(&env, &client);
    let expected_topics = vec![
        &env,
        symbol_short!("fees").into_val(&env),
        treasury.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: FeesCollected = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        FeesCollected {
            to: treasury.clone(),
            amount: FEE,
        }
    );
}
