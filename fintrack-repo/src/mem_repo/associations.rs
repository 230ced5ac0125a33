//! The only place the two junction sets are mutated. Callers have already
//! resolved the ids they pass in.

use super::State;

pub(super) fn link_users(state: &mut State, transaction_id: i32, user_ids: &[i32]) {
    for user_id in user_ids {
        state.user_transactions.insert((*user_id, transaction_id));
    }
}

pub(super) fn link_categories(state: &mut State, transaction_id: i32, category_ids: &[i32]) {
    for category_id in category_ids {
        state
            .transaction_categories
            .insert((transaction_id, *category_id));
    }
}

pub(super) fn replace_transaction_users(state: &mut State, transaction_id: i32, user_ids: &[i32]) {
    state
        .user_transactions
        .retain(|(_, t)| *t != transaction_id);
    link_users(state, transaction_id, user_ids);
}

pub(super) fn replace_transaction_categories(
    state: &mut State,
    transaction_id: i32,
    category_ids: &[i32],
) {
    state
        .transaction_categories
        .retain(|(t, _)| *t != transaction_id);
    link_categories(state, transaction_id, category_ids);
}

/// Cascade for a user deletion: drop every pairing the user owned.
pub(super) fn unlink_user(state: &mut State, user_id: i32) {
    state.user_transactions.retain(|(u, _)| *u != user_id);
}

/// Cascade for a category deletion.
pub(super) fn unlink_category(state: &mut State, category_id: i32) {
    state
        .transaction_categories
        .retain(|(_, c)| *c != category_id);
}

/// Cascade for a transaction deletion: both sides go.
pub(super) fn unlink_transaction(state: &mut State, transaction_id: i32) {
    state
        .user_transactions
        .retain(|(_, t)| *t != transaction_id);
    state
        .transaction_categories
        .retain(|(t, _)| *t != transaction_id);
}

pub(super) fn transaction_user_ids(state: &State, transaction_id: i32) -> Vec<i32> {
    state
        .user_transactions
        .iter()
        .filter(|(_, t)| *t == transaction_id)
        .map(|(u, _)| *u)
        .collect()
}

pub(super) fn transaction_category_names(state: &State, transaction_id: i32) -> Vec<String> {
    let mut names: Vec<String> = state
        .transaction_categories
        .iter()
        .filter(|(t, _)| *t == transaction_id)
        .filter_map(|(_, c)| state.categories.get(c))
        .map(|category| category.name.clone())
        .collect();
    names.sort();
    names
}
