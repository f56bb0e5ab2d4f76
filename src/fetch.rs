// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::AccountIncome;
use crate::api::{ApiError, BalanceSource, IncomeSource};
use crate::models::{Account, Balance};
use crate::session::Session;
use futures::future::join_all;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Run `fetch` for every account concurrently and wait for all of them.
/// A fetch that does not finish within `timeout` counts as failed; one
/// failure never cancels the others.
pub async fn fan_out<'a, T, F, Fut>(
    accounts: &'a [Account],
    timeout: Duration,
    fetch: F,
) -> Vec<(&'a Account, Result<T, ApiError>)>
where
    F: Fn(&'a Account) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let tasks = accounts.iter().map(|account| {
        let fut = fetch(account);
        async move {
            let result = match tokio::time::timeout(timeout, fut).await {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout(timeout)),
            };
            (account, result)
        }
    });
    join_all(tasks).await
}

/// List accounts, then fetch each account's income. Failing to list the
/// accounts is an error; a failed income fetch only marks that account.
pub async fn fetch_accounts_with_income<S: IncomeSource>(
    source: &S,
    session: &Session,
    timeout: Duration,
) -> Result<Vec<AccountIncome>, ApiError> {
    let accounts = source.fetch_accounts(session).await?;
    info!(accounts = accounts.len(), "fetching income");
    let results = fan_out(&accounts, timeout, |account| {
        source.fetch_income(session, &account.id)
    })
    .await;
    Ok(results
        .into_iter()
        .map(|(account, result)| match result {
            Ok(records) => AccountIncome::from_records(account.clone(), records),
            Err(err) => {
                warn!(account = %account.id, error = %err, "failed to fetch income");
                AccountIncome::failed(account.clone(), err.to_string())
            }
        })
        .collect())
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountBalance {
    pub account: Account,
    pub balance: Option<Balance>,
    pub error: Option<String>,
}

pub async fn fetch_balances<S: BalanceSource>(
    source: &S,
    session: &Session,
    accounts: &[Account],
    timeout: Duration,
) -> Vec<AccountBalance> {
    fan_out(accounts, timeout, |account| {
        source.fetch_balance(session, &account.id)
    })
    .await
    .into_iter()
    .map(|(account, result)| match result {
        Ok(balance) => AccountBalance {
            account: account.clone(),
            balance: Some(balance),
            error: None,
        },
        Err(err) => {
            warn!(account = %account.id, error = %err, "failed to fetch balance");
            AccountBalance {
                account: account.clone(),
                balance: None,
                error: Some(err.to_string()),
            }
        }
    })
    .collect()
}
