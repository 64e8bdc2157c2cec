use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Open,
    Login,
    Logout,
    Deposit,
    Withdraw,
    Transfer,
    #[serde(alias = "mobile_topup")]
    Topup,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Open {
        name: String,
        passcode: String,
        opening_balance: Decimal,
    },
    Login {
        account: String,
        passcode: String,
    },
    Logout,
    Deposit {
        amount: Decimal,
    },
    Withdraw {
        amount: Decimal,
    },
    Transfer {
        target: String,
        amount: Decimal,
    },
    MobileTopUp {
        destination: String,
        amount: Decimal,
    },
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationField {
    Account,
    Name,
    Passcode,
    Amount,
    Target,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OperationParseError {
    #[error("{field:?} is required for {kind:?}")]
    FieldRequired {
        kind: OperationKind,
        field: OperationField,
    },
}

/// Raw column values of one scripted step, before they are checked against
/// what the operation kind needs.
#[derive(Debug, Default, Clone)]
pub struct OperationFields {
    pub account: Option<String>,
    pub name: Option<String>,
    pub passcode: Option<String>,
    pub amount: Option<Decimal>,
    pub target: Option<String>,
}

impl Operation {
    pub fn parse(kind: OperationKind, fields: OperationFields) -> Result<Self, OperationParseError> {
        let require = |field: OperationField, value: Option<String>| {
            value
                .filter(|v| !v.is_empty())
                .ok_or(OperationParseError::FieldRequired { kind, field })
        };
        let require_amount = |value: Option<Decimal>| {
            value.ok_or(OperationParseError::FieldRequired {
                kind,
                field: OperationField::Amount,
            })
        };

        let OperationFields {
            account,
            name,
            passcode,
            amount,
            target,
        } = fields;

        match kind {
            OperationKind::Open => Ok(Self::Open {
                name: require(OperationField::Name, name)?,
                passcode: require(OperationField::Passcode, passcode)?,
                opening_balance: require_amount(amount)?,
            }),
            OperationKind::Login => Ok(Self::Login {
                account: require(OperationField::Account, account)?,
                passcode: require(OperationField::Passcode, passcode)?,
            }),
            OperationKind::Logout => Ok(Self::Logout),
            OperationKind::Deposit => Ok(Self::Deposit {
                amount: require_amount(amount)?,
            }),
            OperationKind::Withdraw => Ok(Self::Withdraw {
                amount: require_amount(amount)?,
            }),
            OperationKind::Transfer => Ok(Self::Transfer {
                target: require(OperationField::Target, target)?,
                amount: require_amount(amount)?,
            }),
            OperationKind::Topup => Ok(Self::MobileTopUp {
                destination: require(OperationField::Target, target)?,
                amount: require_amount(amount)?,
            }),
            OperationKind::Close => Ok(Self::Close),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_open() {
        let op = Operation::parse(
            OperationKind::Open,
            OperationFields {
                name: Some("Alice".into()),
                passcode: Some("1234".into()),
                amount: Some(dec!(1000)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            op,
            Operation::Open {
                name: "Alice".into(),
                passcode: "1234".into(),
                opening_balance: dec!(1000)
            }
        );
    }

    #[test]
    fn missing_fields_are_reported() {
        let err = Operation::parse(OperationKind::Deposit, OperationFields::default()).unwrap_err();
        assert_eq!(
            err,
            OperationParseError::FieldRequired {
                kind: OperationKind::Deposit,
                field: OperationField::Amount
            }
        );
        assert_eq!(err.to_string(), "Amount is required for Deposit");

        // empty strings count as missing
        let err = Operation::parse(
            OperationKind::Topup,
            OperationFields {
                target: Some(String::new()),
                amount: Some(dec!(10)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            OperationParseError::FieldRequired {
                kind: OperationKind::Topup,
                field: OperationField::Target
            }
        );
    }

    #[test]
    fn field_free_operations() {
        assert_eq!(
            Operation::parse(OperationKind::Logout, OperationFields::default()).unwrap(),
            Operation::Logout
        );
        assert_eq!(
            Operation::parse(OperationKind::Close, OperationFields::default()).unwrap(),
            Operation::Close
        );
    }

    #[test]
    fn negative_amounts_pass_parsing() {
        // amount rules belong to the ledger, parsing only checks presence
        let op = Operation::parse(
            OperationKind::Withdraw,
            OperationFields {
                amount: Some(dec!(-5)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(op, Operation::Withdraw { amount: dec!(-5) });
    }
}
