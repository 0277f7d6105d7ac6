//! Subcommands and their execution against a [`WalletApi`].

use clap::Subcommand;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::api::{ClientError, SignRequest, SubmitRequest, WalletApi};
use crate::domain::{parse_amount, TemplateError, TransactionTemplateBuilder, TxKind};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build an issue or spend transaction template
    BuildTransaction {
        account_id: String,
        asset_id: String,
        amount: String,
        /// Receiver control program (spend only)
        receiver_arg: Option<String>,
        /// Template type: issue or spend
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
        /// Receiver control program, overrides the positional argument
        #[arg(short, long)]
        receiver: Option<String>,
        /// Gas paid in the native asset
        #[arg(short, long, default_value = "20000000")]
        gas: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Sign a transaction template with a key password
    SignTransaction {
        template: String,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Submit a signed transaction template
    SubmitTransaction { template: String },
    /// Sign a template and submit it in one round trip
    SignSubmitTransaction {
        template: String,
        #[arg(short, long)]
        password: String,
    },
    /// List wallet transactions
    ListTransactions {
        #[arg(long, default_value = "")]
        id: String,
        #[arg(long, default_value = "")]
        account_id: String,
    },
    /// Print the node's current gas rate
    GasRate,
}

impl From<TemplateError> for ClientError {
    fn from(e: TemplateError) -> Self {
        ClientError::Validation(e.to_string())
    }
}

fn template_arg(raw: &str) -> Result<Value, ClientError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ Value::Object(_)) => Ok(v),
        Ok(_) => Err(ClientError::Validation("template must be a JSON object".into())),
        Err(e) => Err(ClientError::Validation(format!("invalid template JSON: {e}"))),
    }
}

fn to_body<T: Serialize>(req: &T) -> Result<Value, ClientError> {
    serde_json::to_value(req).map_err(|e| ClientError::Validation(e.to_string()))
}

fn pretty(value: &Value) -> Result<String, ClientError> {
    serde_json::to_string_pretty(value).map_err(|e| ClientError::Parse(e.to_string()))
}

fn compact(value: &Value) -> Result<String, ClientError> {
    serde_json::to_string(value).map_err(|e| ClientError::Parse(e.to_string()))
}

/// What a command needs to send, decided before any connection exists.
enum Plan {
    Build { kind: TxKind, body: Value, pretty: bool },
    Sign { body: Value, pretty: bool },
    Submit { body: Value },
    SignSubmit { body: Value },
    ListTransactions { body: Value },
    GasRate,
}

fn plan(cmd: Command) -> Result<Plan, ClientError> {
    Ok(match cmd {
        Command::BuildTransaction {
            account_id,
            asset_id,
            amount,
            receiver_arg,
            kind,
            receiver,
            gas,
            pretty,
        } => {
            let kind: TxKind = kind
                .ok_or_else(|| ClientError::Validation("missing --type (issue or spend)".into()))?
                .parse()?;
            let builder = TransactionTemplateBuilder::new(
                kind,
                account_id,
                asset_id,
                parse_amount("amount", &amount)?,
            )
            .receiver(receiver.or(receiver_arg))
            .gas(parse_amount("gas", &gas)?);
            Plan::Build {
                kind,
                body: to_body(&builder.build()?)?,
                pretty,
            }
        }
        Command::SignTransaction {
            template,
            password,
            pretty,
        } => Plan::Sign {
            body: to_body(&SignRequest {
                auth: password,
                transaction: template_arg(&template)?,
            })?,
            pretty,
        },
        Command::SubmitTransaction { template } => Plan::Submit {
            body: to_body(&SubmitRequest {
                transaction: template_arg(&template)?,
            })?,
        },
        Command::SignSubmitTransaction { template, password } => Plan::SignSubmit {
            body: to_body(&SignRequest {
                auth: password,
                transaction: template_arg(&template)?,
            })?,
        },
        Command::ListTransactions { id, account_id } => Plan::ListTransactions {
            body: json!({ "id": id, "account_id": account_id }),
        },
        Command::GasRate => Plan::GasRate,
    })
}

/// Run one command and return what should be printed.
///
/// Arguments are validated before `connect` is called, so a validation
/// failure never constructs a client.
pub async fn execute<A, F>(cmd: Command, connect: F) -> Result<String, ClientError>
where
    A: WalletApi,
    F: FnOnce() -> Result<A, ClientError>,
{
    let plan = plan(cmd)?;
    let api = connect()?;

    match plan {
        Plan::Build { kind, body, pretty } => {
            let data = api.call("build-transaction", body).await?;
            if !data.is_object() {
                return Err(ClientError::Parse("template is not a JSON object".into()));
            }
            info!(%kind, "Built transaction template");
            if pretty {
                self::pretty(&data)
            } else {
                Ok(format!("Template Type: {kind}\n{}", compact(&data)?))
            }
        }
        Plan::Sign { body, pretty } => {
            let data = api.call("sign-transaction", body).await?;
            if pretty {
                self::pretty(&data)
            } else {
                Ok(format!("\nSign Template:\n{}", compact(&data)?))
            }
        }
        Plan::Submit { body } => self::pretty(&api.call("submit-transaction", body).await?),
        Plan::SignSubmit { body } => {
            self::pretty(&api.call("sign-submit-transaction", body).await?)
        }
        Plan::ListTransactions { body } => {
            let data = api.call("list-transactions", body).await?;
            let items = data
                .as_array()
                .ok_or_else(|| ClientError::Parse("transactions are not a JSON array".into()))?;
            debug!(count = items.len(), "Listed transactions");
            items
                .iter()
                .map(compact)
                .collect::<Result<Vec<_>, _>>()
                .map(|lines| lines.join("\n"))
        }
        Plan::GasRate => self::pretty(&api.call("gas-rate", json!({})).await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::exit;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records calls and answers from a canned reply.
    struct FakeApi {
        reply: Result<Value, (i32, String)>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl FakeApi {
        fn ok(reply: Value) -> Self {
            Self {
                reply: Ok(reply),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(code: i32, message: &str) -> Self {
            Self {
                reply: Err((code, message.to_string())),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WalletApi for &FakeApi {
        async fn call(&self, path: &str, body: Value) -> Result<Value, ClientError> {
            self.calls.lock().unwrap().push((path.to_string(), body));
            match &self.reply {
                Ok(v) => Ok(v.clone()),
                Err((code, message)) => Err(ClientError::Remote {
                    code: *code,
                    message: message.clone(),
                }),
            }
        }
    }

    fn build(kind: &str, receiver: Option<&str>, pretty: bool) -> Command {
        Command::BuildTransaction {
            account_id: "acc1".into(),
            asset_id: "aa".into(),
            amount: "100".into(),
            receiver_arg: None,
            kind: Some(kind.into()),
            receiver: receiver.map(String::from),
            gas: "20000000".into(),
            pretty,
        }
    }

    #[test]
    fn test_issue_without_receiver_builds() {
        let api = FakeApi::ok(json!({"raw_transaction": "00"}));
        let out = tokio_test::block_on(execute(build("issue", None, false), || Ok(&api))).unwrap();

        assert_eq!(out, "Template Type: issue\n{\"raw_transaction\":\"00\"}");
        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].0, "build-transaction");
        assert_eq!(calls[0].1["actions"].as_array().unwrap().len(), 3);
        assert_eq!(calls[0].1["actions"][1]["type"], "issue");
    }

    #[test]
    fn test_spend_without_receiver_never_connects() {
        let mut connected = false;
        let err = tokio_test::block_on(execute(build("spend", None, false), || {
            connected = true;
            Err::<&FakeApi, _>(ClientError::Connection("unreachable".into()))
        }))
        .unwrap_err();

        assert_eq!(err.exit_code(), exit::LOCAL_EXEC);
        assert!(!connected);
    }

    #[test]
    fn test_bad_inputs_are_validation_errors() {
        let api = FakeApi::ok(json!({}));
        let cases = vec![
            build("retire", None, false),
            Command::BuildTransaction {
                account_id: "acc1".into(),
                asset_id: "aa".into(),
                amount: "lots".into(),
                receiver_arg: None,
                kind: Some("issue".into()),
                receiver: None,
                gas: "20000000".into(),
                pretty: false,
            },
            Command::SubmitTransaction {
                template: "[1,2]".into(),
            },
            Command::SignTransaction {
                template: "{not json".into(),
                password: "pw".into(),
                pretty: false,
            },
        ];
        for cmd in cases {
            let err = tokio_test::block_on(execute(cmd, || Ok(&api))).unwrap_err();
            assert_eq!(err.exit_code(), exit::LOCAL_EXEC);
        }
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_positional_receiver_is_used_for_spend() {
        let api = FakeApi::ok(json!({}));
        let cmd = Command::BuildTransaction {
            account_id: "acc1".into(),
            asset_id: "aa".into(),
            amount: "5".into(),
            receiver_arg: Some("0014ab".into()),
            kind: Some("spend".into()),
            receiver: None,
            gas: "1".into(),
            pretty: true,
        };
        let out = tokio_test::block_on(execute(cmd, || Ok(&api))).unwrap();

        assert_eq!(out, "{}");
        let calls = api.calls.lock().unwrap();
        assert_eq!(
            calls[0].1["actions"][2]["receiver"]["control_program"],
            "0014ab"
        );
    }

    #[test]
    fn test_sign_output_formats() {
        let api = FakeApi::ok(json!({"sign_complete": true}));
        let cmd = Command::SignTransaction {
            template: r#"{"raw_transaction":"00"}"#.into(),
            password: "pw".into(),
            pretty: false,
        };
        let out = tokio_test::block_on(execute(cmd, || Ok(&api))).unwrap();
        assert_eq!(out, "\nSign Template:\n{\"sign_complete\":true}");

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].1["auth"], "pw");
        assert_eq!(calls[0].1["transaction"]["raw_transaction"], "00");
    }

    #[test]
    fn test_list_transactions_prints_one_per_line() {
        let api = FakeApi::ok(json!([{"id": "t1"}, {"id": "t2"}]));
        let cmd = Command::ListTransactions {
            id: String::new(),
            account_id: String::new(),
        };
        let out = tokio_test::block_on(execute(cmd, || Ok(&api))).unwrap();
        assert_eq!(out, "{\"id\":\"t1\"}\n{\"id\":\"t2\"}");
    }

    #[test]
    fn test_unexpected_shape_is_parse_error() {
        let api = FakeApi::ok(json!({"not": "a list"}));
        let cmd = Command::ListTransactions {
            id: String::new(),
            account_id: String::new(),
        };
        let err = tokio_test::block_on(execute(cmd, || Ok(&api))).unwrap_err();
        assert_eq!(err.exit_code(), exit::LOCAL_PARSE);
    }

    #[test]
    fn test_remote_failure_keeps_remote_code() {
        let api = FakeApi::failing(-32000, "insufficient funds");
        let err = tokio_test::block_on(execute(Command::GasRate, || Ok(&api))).unwrap_err();
        assert_eq!(err.exit_code(), exit::REMOTE);
        assert_eq!(err.to_string(), "remote error -32000: insufficient funds");
    }
}
