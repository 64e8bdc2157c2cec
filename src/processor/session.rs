use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{Account, AccountNumber, ErrorKind, format_amount},
    command::Operation,
    config::BankConfig,
    directory::{AccountDirectory, DirectoryError},
};

use super::{OperationProcessor, Outcome, ProcessError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No account is logged in")]
    NotLoggedIn,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl SessionError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SessionError::NotLoggedIn => None,
            SessionError::Directory(err) => Some(err.kind()),
        }
    }
}

/// Snapshot of what the front end shows for the logged-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub account_number: AccountNumber,
    pub name: String,
    pub balance: Decimal,
    /// Newest first.
    pub recent_transactions: Vec<String>,
}

impl fmt::Display for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Account: {}", self.account_number)?;
        writeln!(f, "Holder: {}", self.name)?;
        write!(f, "Balance: {}", format_amount(self.balance))?;
        if self.recent_transactions.is_empty() {
            write!(f, "\nNo transactions yet")?;
        }
        for entry in &self.recent_transactions {
            write!(f, "\n• {entry}")?;
        }
        Ok(())
    }
}

/// Front-end state: the directory plus whichever account is logged in.
#[derive(Debug)]
pub struct Session {
    directory: AccountDirectory,
    current: Option<AccountNumber>,
}

impl Session {
    pub fn new(directory: AccountDirectory) -> Self {
        Self {
            directory,
            current: None,
        }
    }

    pub fn directory(&self) -> &AccountDirectory {
        &self.directory
    }

    pub fn current(&self) -> Option<&Account> {
        self.current
            .as_deref()
            .and_then(|number| self.directory.get(number))
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn view(&self) -> Option<SessionView> {
        let acc = self.current()?;
        Some(SessionView {
            account_number: acc.number().to_string(),
            name: acc.name().to_string(),
            balance: acc.balance(),
            recent_transactions: acc
                .recent_transactions(self.directory.config().history_limit)
                .map(ToString::to_string)
                .collect(),
        })
    }

    /// Opening an account does not log into it.
    pub fn open_account(
        &mut self,
        name: &str,
        passcode: &str,
        opening_balance: Decimal,
    ) -> Result<AccountNumber, SessionError> {
        Ok(self.directory.open_account(name, passcode, opening_balance)?)
    }

    /// `account` is an account number, or the holder's name when no account
    /// carries that number.
    pub fn login(&mut self, account: &str, passcode: &str) -> Result<AccountNumber, SessionError> {
        let number = self.resolve(account);
        let number = self
            .directory
            .authenticate(&number, passcode)?
            .number()
            .to_string();
        tracing::info!(account_number = %number, "logged in");
        self.current = Some(number.clone());
        Ok(number)
    }

    pub fn logout(&mut self) {
        if let Some(number) = self.current.take() {
            tracing::info!(account_number = %number, "logged out");
        }
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, SessionError> {
        let acc = self.current_mut()?;
        Ok(acc.deposit(amount).map_err(DirectoryError::from)?)
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<Decimal, SessionError> {
        let acc = self.current_mut()?;
        Ok(acc.withdraw(amount).map_err(DirectoryError::from)?)
    }

    pub fn transfer(&mut self, target: &str, amount: Decimal) -> Result<Decimal, SessionError> {
        let from = self.current.clone().ok_or(SessionError::NotLoggedIn)?;
        let to = self.resolve(target);
        Ok(self.directory.transfer(&from, &to, amount)?)
    }

    pub fn mobile_top_up(
        &mut self,
        destination: &str,
        amount: Decimal,
    ) -> Result<Decimal, SessionError> {
        let acc = self.current_mut()?;
        Ok(acc
            .mobile_top_up(amount, destination)
            .map_err(DirectoryError::from)?)
    }

    /// Closes the logged-in account and logs out.
    pub fn close_account(&mut self) -> Result<AccountNumber, SessionError> {
        let number = self.current.clone().ok_or(SessionError::NotLoggedIn)?;
        self.directory.close_account(&number)?;
        self.current = None;
        Ok(number)
    }

    fn current_mut(&mut self) -> Result<&mut Account, SessionError> {
        let number = self.current.as_deref().ok_or(SessionError::NotLoggedIn)?;
        self.directory
            .get_mut(number)
            .ok_or(SessionError::NotLoggedIn)
    }

    fn resolve(&self, account: &str) -> AccountNumber {
        if self.directory.contains(account) {
            return account.to_string();
        }
        self.directory
            .find_by_name(account)
            .map(|acc| acc.number().to_string())
            .unwrap_or_else(|| account.to_string())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AccountDirectory::new(BankConfig::default()))
    }
}

impl OperationProcessor for Session {
    fn process_operation(&mut self, operation: Operation) -> Result<Outcome, ProcessError> {
        let outcome = match operation {
            Operation::Open {
                name,
                passcode,
                opening_balance,
            } => Outcome::Opened {
                account_number: self.open_account(&name, &passcode, opening_balance)?,
            },
            Operation::Login { account, passcode } => Outcome::LoggedIn {
                account_number: self.login(&account, &passcode)?,
            },
            Operation::Logout => {
                self.logout();
                Outcome::LoggedOut
            }
            Operation::Deposit { amount } => Outcome::Balance(self.deposit(amount)?),
            Operation::Withdraw { amount } => Outcome::Balance(self.withdraw(amount)?),
            Operation::Transfer { target, amount } => {
                Outcome::Balance(self.transfer(&target, amount)?)
            }
            Operation::MobileTopUp {
                destination,
                amount,
            } => Outcome::Balance(self.mobile_top_up(&destination, amount)?),
            Operation::Close => Outcome::Closed {
                account_number: self.close_account()?,
            },
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::{account::LedgerError, command::OperationKind, command::OperationFields};

    use super::*;

    fn session() -> Session {
        Session::new(AccountDirectory::with_seed(BankConfig::default(), 11))
    }

    #[test]
    fn mutations_require_login() {
        let mut s = session();
        let number = s.open_account("Alice", "1234", dec!(1000)).unwrap();
        assert!(!s.is_logged_in());

        assert_eq!(s.deposit(dec!(10)).unwrap_err(), SessionError::NotLoggedIn);
        assert_eq!(s.withdraw(dec!(10)).unwrap_err(), SessionError::NotLoggedIn);
        assert_eq!(
            s.transfer(&number, dec!(10)).unwrap_err(),
            SessionError::NotLoggedIn
        );
        assert_eq!(
            s.mobile_top_up("17123456", dec!(10)).unwrap_err(),
            SessionError::NotLoggedIn
        );
        assert_eq!(s.close_account().unwrap_err(), SessionError::NotLoggedIn);
        assert_eq!(SessionError::NotLoggedIn.kind(), None);

        let acc = s.directory().get(&number).unwrap();
        assert_eq!(acc.balance(), dec!(1000));
        assert!(acc.transactions().next().is_none());
        assert!(s.view().is_none());
    }

    #[test]
    fn login_by_number_or_name() {
        let mut s = session();
        let number = s.open_account("Alice", "1234", dec!(1000)).unwrap();

        assert_eq!(s.login(&number, "1234").unwrap(), number);
        s.logout();
        assert!(s.current().is_none());

        assert_eq!(s.login("Alice", "1234").unwrap(), number);
        assert_eq!(s.current().unwrap().name(), "Alice");

        let err = s.login("Alice", "0000").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::BadCredentials));
        // a failed login keeps the previous session
        assert_eq!(s.current().unwrap().number(), number);

        let err = s.login("Nobody", "1234").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn banking_through_the_session() {
        let mut s = session();
        let alice = s.open_account("Alice", "1234", dec!(1000)).unwrap();
        let bob = s.open_account("Bob", "4321", dec!(500)).unwrap();
        s.login(&alice, "1234").unwrap();

        assert_eq!(s.deposit(dec!(200)).unwrap(), dec!(1200));
        assert_eq!(s.withdraw(dec!(300)).unwrap(), dec!(900));
        assert_eq!(s.transfer("Bob", dec!(400)).unwrap(), dec!(500));
        assert_eq!(s.mobile_top_up("17123456", dec!(100)).unwrap(), dec!(400));
        assert_eq!(s.directory().get(&bob).unwrap().balance(), dec!(900));

        let err = s.withdraw(dec!(401)).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InsufficientFunds));
        assert!(matches!(
            err,
            SessionError::Directory(DirectoryError::Ledger(LedgerError::InsufficientFunds { .. }))
        ));
        let err = s.transfer(&alice, dec!(1)).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidAmount));

        let view = s.view().unwrap();
        assert_eq!(view.account_number, alice);
        assert_eq!(view.balance, dec!(400));
        assert_eq!(
            view.recent_transactions,
            [
                "Mobile top-up Nu.100.00 to 17123456",
                "Sent Nu.400.00 to Bob",
                "Withdrew Nu.300.00",
                "Deposited Nu.200.00",
            ]
        );
        assert!(view.to_string().starts_with(&format!(
            "Account: {alice}\nHolder: Alice\nBalance: Nu.400.00\n• Mobile top-up"
        )));
    }

    #[test]
    fn view_shows_limited_history() {
        let config = BankConfig {
            history_limit: 3,
            ..Default::default()
        };
        let mut s = Session::new(AccountDirectory::with_seed(config, 1));
        let number = s.open_account("Alice", "1234", dec!(500)).unwrap();
        s.login(&number, "1234").unwrap();
        assert_eq!(
            s.view().unwrap().to_string(),
            format!("Account: {number}\nHolder: Alice\nBalance: Nu.500.00\nNo transactions yet")
        );
        for i in 1..=5 {
            s.deposit(Decimal::from(i)).unwrap();
        }
        let view = s.view().unwrap();
        assert_eq!(
            view.recent_transactions,
            ["Deposited Nu.5.00", "Deposited Nu.4.00", "Deposited Nu.3.00"]
        );
        // the account itself keeps everything
        assert_eq!(s.current().unwrap().transactions().len(), 5);
    }

    #[test]
    fn close_account_logs_out() {
        let mut s = session();
        let number = s.open_account("Alice", "1234", dec!(1000)).unwrap();
        s.login(&number, "1234").unwrap();
        assert_eq!(s.close_account().unwrap(), number);
        assert!(!s.is_logged_in());
        assert!(s.view().is_none());
        assert!(s.directory().is_empty());
        assert!(s.login(&number, "1234").is_err());
    }

    #[test]
    fn process_operations() {
        let mut s = session();
        let parse = |kind, fields| Operation::parse(kind, fields).unwrap();

        let opened = s
            .process_operation(parse(
                OperationKind::Open,
                OperationFields {
                    name: Some("Alice".into()),
                    passcode: Some("1234".into()),
                    amount: Some(dec!(1000)),
                    ..Default::default()
                },
            ))
            .unwrap();
        let Outcome::Opened { account_number } = opened else {
            panic!("expected an opened account");
        };

        let err = s
            .process_operation(parse(
                OperationKind::Deposit,
                OperationFields {
                    amount: Some(dec!(5)),
                    ..Default::default()
                },
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessError::SessionErr(SessionError::NotLoggedIn)
        ));

        assert_eq!(
            s.process_operation(Operation::Login {
                account: account_number.clone(),
                passcode: "1234".into()
            })
            .unwrap(),
            Outcome::LoggedIn {
                account_number: account_number.clone()
            }
        );
        assert_eq!(
            s.process_operation(Operation::Deposit { amount: dec!(5) })
                .unwrap(),
            Outcome::Balance(dec!(1005))
        );
        assert_eq!(
            s.process_operation(Operation::Close).unwrap(),
            Outcome::Closed { account_number }
        );
        assert_eq!(
            s.process_operation(Operation::Logout).unwrap(),
            Outcome::LoggedOut
        );
    }
}
