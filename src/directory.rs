use std::collections::BTreeMap;

use rand::{Rng, SeedableRng, rngs::StdRng};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{Account, AccountNumber, ErrorKind, LedgerError, TransferEvents},
    config::BankConfig,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("Account holder name must not be empty")]
    InvalidName,
    #[error("Account with name `{name}` already exists")]
    DuplicateName { name: String },
    #[error("Invalid passcode. Must be at least {min_digits} digits")]
    InvalidPasscode { min_digits: usize },
    #[error("Opening balance {provided} is below the minimum of {minimum}")]
    OpeningBalanceTooLow { minimum: Decimal, provided: Decimal },
    #[error("Account `{account_number}` not found")]
    NotFound { account_number: AccountNumber },
    #[error("Incorrect passcode")]
    BadCredentials,
    #[error("No free account numbers left")]
    DirectoryFull,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl DirectoryError {
    /// Directory input errors count as invalid amounts; running out of
    /// numbers is reported the same way since the request cannot be served.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::InvalidName
            | DirectoryError::DuplicateName { .. }
            | DirectoryError::InvalidPasscode { .. }
            | DirectoryError::OpeningBalanceTooLow { .. }
            | DirectoryError::DirectoryFull => ErrorKind::InvalidAmount,
            DirectoryError::NotFound { .. } => ErrorKind::NotFound,
            DirectoryError::BadCredentials => ErrorKind::BadCredentials,
            DirectoryError::Ledger(err) => err.kind(),
        }
    }
}

/// Registry of open accounts keyed by their generated number.
#[derive(Debug)]
pub struct AccountDirectory {
    config: BankConfig,
    accounts: BTreeMap<AccountNumber, Account>,
    rng: StdRng,
}

impl AccountDirectory {
    pub fn new(config: BankConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Same as [`AccountDirectory::new`], but account numbers are reproducible.
    pub fn with_seed(config: BankConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: BankConfig, rng: StdRng) -> Self {
        Self {
            config,
            accounts: BTreeMap::new(),
            rng,
        }
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn contains(&self, account_number: &str) -> bool {
        self.accounts.contains_key(account_number)
    }

    pub fn get(&self, account_number: &str) -> Option<&Account> {
        self.accounts.get(account_number)
    }

    pub fn get_mut(&mut self, account_number: &str) -> Option<&mut Account> {
        self.accounts.get_mut(account_number)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Account> {
        self.accounts.values().find(|acc| acc.name() == name)
    }

    /// Accounts ordered by account number.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Draws uniformly from the configured range until it hits a number that
    /// is not taken yet.
    pub fn generate_account_number(&mut self) -> Result<AccountNumber, DirectoryError> {
        if self.accounts.len() >= self.config.account_number_capacity() {
            return Err(DirectoryError::DirectoryFull);
        }
        loop {
            let candidate = self
                .rng
                .gen_range(self.config.account_number_range())
                .to_string();
            if !self.accounts.contains_key(&candidate) {
                return Ok(candidate);
            }
            tracing::trace!(%candidate, "account number collision, drawing again");
        }
    }

    pub fn open_account(
        &mut self,
        name: &str,
        passcode: &str,
        opening_balance: Decimal,
    ) -> Result<AccountNumber, DirectoryError> {
        if name.is_empty() {
            return Err(DirectoryError::InvalidName);
        }
        if self.find_by_name(name).is_some() {
            return Err(DirectoryError::DuplicateName {
                name: name.to_string(),
            });
        }
        let min_digits = self.config.passcode_min_digits;
        if passcode.chars().count() < min_digits || !passcode.chars().all(|c| c.is_ascii_digit())
        {
            return Err(DirectoryError::InvalidPasscode { min_digits });
        }
        let minimum = self.config.minimum_opening_balance.max(Decimal::ZERO);
        if opening_balance < minimum {
            return Err(DirectoryError::OpeningBalanceTooLow {
                minimum,
                provided: opening_balance,
            });
        }

        let account_number = self.generate_account_number()?;
        self.accounts.insert(
            account_number.clone(),
            Account::new(account_number.clone(), name, passcode, opening_balance),
        );
        tracing::info!(%account_number, name, %opening_balance, "account opened");
        Ok(account_number)
    }

    pub fn authenticate(
        &self,
        account_number: &str,
        passcode: &str,
    ) -> Result<&Account, DirectoryError> {
        let acc = self.lookup(account_number)?;
        if !acc.passcode_matches(passcode) {
            tracing::warn!(account_number, "rejected passcode");
            return Err(DirectoryError::BadCredentials);
        }
        Ok(acc)
    }

    /// Removes the account together with its transaction log.
    pub fn close_account(&mut self, account_number: &str) -> Result<Account, DirectoryError> {
        let acc = self
            .accounts
            .remove(account_number)
            .ok_or_else(|| not_found(account_number))?;
        tracing::info!(account_number, "account closed");
        Ok(acc)
    }

    /// Transfers between two stored accounts. Validation and both lookups run
    /// before either account is mutated.
    pub fn transfer(
        &mut self,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<Decimal, DirectoryError> {
        let TransferEvents { debit, credit } = {
            let source = self.lookup(from)?;
            let target = self.lookup(to)?;
            source.handle_transfer(amount, target)?
        };
        // the source leaves the map so both accounts can be borrowed mutably
        let mut source = self.accounts.remove(from).ok_or_else(|| not_found(from))?;
        let Some(target) = self.accounts.get_mut(to) else {
            self.accounts.insert(from.to_string(), source);
            return Err(not_found(to));
        };
        source.apply(&debit);
        target.apply(&credit);
        let balance = source.balance();
        self.accounts.insert(from.to_string(), source);
        Ok(balance)
    }

    fn lookup(&self, account_number: &str) -> Result<&Account, DirectoryError> {
        self.accounts
            .get(account_number)
            .ok_or_else(|| not_found(account_number))
    }
}

impl Default for AccountDirectory {
    fn default() -> Self {
        Self::new(BankConfig::default())
    }
}

fn not_found(account_number: &str) -> DirectoryError {
    DirectoryError::NotFound {
        account_number: account_number.to_string(),
    }
}
