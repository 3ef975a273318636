use crate::error::ApiError;
use crate::executor::Passwords;
use indexmap::IndexMap;
use log::warn;
use serde_json::Value;
use std::path::PathBuf;

/// Loosely-typed option layer, merged over defaults before a run.
pub type OptionsBag = IndexMap<String, Value>;

/// The normalized options record handed to the engine.
///
/// Built by layering bags over the defaults: runner-level custom options
/// first, then per-call overrides, later layers winning.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub check: Option<bool>,
    pub list_tasks: Option<bool>,
    pub list_hosts: Option<bool>,
    pub list_tags: Option<bool>,
    pub syntax: Option<bool>,
    pub module_path: Option<PathBuf>,
    pub skip_tags: Vec<String>,
    pub tags: Vec<String>,
    pub ssh_common_args: String,
    pub sftp_extra_args: String,
    pub scp_extra_args: String,
    pub ssh_extra_args: String,
    pub inventory: Vec<String>,
    pub extra_vars: IndexMap<String, Value>,
    pub subset: Option<String>,
    pub verbosity: u8,
}

impl RunOptions {
    pub(crate) fn defaults(inventory: &[String], subset: Option<String>, verbosity: u8) -> Self {
        RunOptions {
            check: None,
            list_tasks: None,
            list_hosts: None,
            list_tags: None,
            syntax: None,
            module_path: None,
            skip_tags: Vec::new(),
            tags: Vec::new(),
            ssh_common_args: String::new(),
            sftp_extra_args: String::new(),
            scp_extra_args: String::new(),
            ssh_extra_args: String::new(),
            inventory: inventory.to_vec(),
            extra_vars: IndexMap::new(),
            subset,
            verbosity,
        }
    }

    /// Fold one option bag into the record. Null values leave the current
    /// setting untouched; unrecognized keys are dropped with a warning.
    pub(crate) fn apply(&mut self, opts: &OptionsBag) -> Result<(), ApiError> {
        for (key, value) in opts {
            if value.is_null() {
                continue;
            }
            match key.as_str() {
                "check" => self.check = Some(expect_bool("check", value)?),
                "listtasks" => self.list_tasks = Some(expect_bool("listtasks", value)?),
                "listhosts" => self.list_hosts = Some(expect_bool("listhosts", value)?),
                "listtags" => self.list_tags = Some(expect_bool("listtags", value)?),
                "syntax" => self.syntax = Some(expect_bool("syntax", value)?),
                "module_path" => {
                    self.module_path = Some(PathBuf::from(expect_str("module_path", value)?))
                }
                "skip_tags" => self.skip_tags = expect_str_list("skip_tags", value)?,
                "tags" => self.tags = parse_tags(value)?,
                "ssh_common_args" => self.ssh_common_args = expect_str("ssh_common_args", value)?,
                "sftp_extra_args" => self.sftp_extra_args = expect_str("sftp_extra_args", value)?,
                "scp_extra_args" => self.scp_extra_args = expect_str("scp_extra_args", value)?,
                "ssh_extra_args" => self.ssh_extra_args = expect_str("ssh_extra_args", value)?,
                "inventory" => self.inventory = expect_sources("inventory", value)?,
                "extra_vars" => self.extra_vars = expect_mapping("extra_vars", value)?,
                "subset" => self.subset = Some(expect_str("subset", value)?),
                "verbosity" => self.verbosity = expect_u8("verbosity", value)?,
                // credentials are pulled out separately, see Passwords::from_bag
                "conn_pass" | "become_pass" => {}
                _ => warn!("ignoring unrecognized run option `{key}`"),
            }
        }
        Ok(())
    }
}

impl Passwords {
    /// Credentials travel in the per-call bag under `conn_pass` and
    /// `become_pass`; missing keys default to none.
    pub(crate) fn from_bag(opts: &OptionsBag) -> Result<Self, ApiError> {
        let mut passwords = Passwords::default();
        if let Some(value) = opts.get("conn_pass").filter(|v| !v.is_null()) {
            passwords.conn_pass = Some(expect_str("conn_pass", value)?);
        }
        if let Some(value) = opts.get("become_pass").filter(|v| !v.is_null()) {
            passwords.become_pass = Some(expect_str("become_pass", value)?);
        }
        Ok(passwords)
    }
}

/// Tags arrive either as a comma-separated string or as a list of strings.
fn parse_tags(value: &Value) -> Result<Vec<String>, ApiError> {
    match value {
        Value::String(tags) => Ok(tags.split(',').map(str::to_string).collect()),
        Value::Array(_) => expect_str_list("tags", value),
        other => Err(invalid("tags", other)),
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

fn invalid(param: &'static str, value: &Value) -> ApiError {
    ApiError::InvalidParameter {
        param,
        type_name: value_type_name(value).to_string(),
    }
}

fn expect_bool(param: &'static str, value: &Value) -> Result<bool, ApiError> {
    value.as_bool().ok_or_else(|| invalid(param, value))
}

fn expect_str(param: &'static str, value: &Value) -> Result<String, ApiError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(param, value))
}

fn expect_u8(param: &'static str, value: &Value) -> Result<u8, ApiError> {
    value
        .as_u64()
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| invalid(param, value))
}

fn expect_str_list(param: &'static str, value: &Value) -> Result<Vec<String>, ApiError> {
    let items = value.as_array().ok_or_else(|| invalid(param, value))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(param, item))
        })
        .collect()
}

/// Inventory accepts a single source string or a list of sources.
fn expect_sources(param: &'static str, value: &Value) -> Result<Vec<String>, ApiError> {
    match value {
        Value::String(source) => Ok(vec![source.clone()]),
        Value::Array(_) => expect_str_list(param, value),
        other => Err(invalid(param, other)),
    }
}

fn expect_mapping(
    param: &'static str,
    value: &Value,
) -> Result<IndexMap<String, Value>, ApiError> {
    let map = value.as_object().ok_or_else(|| invalid(param, value))?;
    Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn defaults() -> RunOptions {
        RunOptions::defaults(&["hosts.yml".to_string()], None, 0)
    }

    #[test]
    fn defaults_match_the_recognized_table() {
        let options = defaults();
        assert!(options.check.is_none());
        assert!(options.tags.is_empty());
        assert!(options.skip_tags.is_empty());
        assert_eq!(options.ssh_common_args, "");
        assert!(options.extra_vars.is_empty());
        assert!(options.subset.is_none());
        assert_eq!(options.verbosity, 0);
        assert_eq!(options.inventory, vec!["hosts.yml".to_string()]);
    }

    #[test]
    fn tags_string_splits_on_commas() {
        let mut options = defaults();
        let mut bag = OptionsBag::new();
        bag.insert("tags".to_string(), json!("setup,deploy, cleanup"));
        options.apply(&bag).unwrap();
        assert_eq!(options.tags, vec!["setup", "deploy", " cleanup"]);
    }

    #[test]
    fn tags_list_passes_through() {
        let mut options = defaults();
        let mut bag = OptionsBag::new();
        bag.insert("tags".to_string(), json!(["setup", "deploy"]));
        options.apply(&bag).unwrap();
        assert_eq!(options.tags, vec!["setup", "deploy"]);
    }

    #[rstest]
    #[case(json!(42), "Number")]
    #[case(json!(true), "Bool")]
    #[case(json!({"a": 1}), "Object")]
    fn tags_of_any_other_type_are_rejected(#[case] value: Value, #[case] expected: &str) {
        let mut options = defaults();
        let mut bag = OptionsBag::new();
        bag.insert("tags".to_string(), value);
        let err = options.apply(&bag).unwrap_err();
        match err {
            ApiError::InvalidParameter { param, type_name } => {
                assert_eq!(param, "tags");
                assert_eq!(type_name, expected);
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn later_layers_win() {
        let mut options = defaults();

        let mut custom = OptionsBag::new();
        custom.insert("verbosity".to_string(), json!(2));
        custom.insert("check".to_string(), json!(true));
        options.apply(&custom).unwrap();

        let mut call = OptionsBag::new();
        call.insert("verbosity".to_string(), json!(4));
        options.apply(&call).unwrap();

        assert_eq!(options.verbosity, 4);
        assert_eq!(options.check, Some(true));
    }

    #[test]
    fn null_values_leave_settings_untouched() {
        let mut options = defaults();
        let mut bag = OptionsBag::new();
        bag.insert("subset".to_string(), json!("web*"));
        options.apply(&bag).unwrap();

        let mut second = OptionsBag::new();
        second.insert("subset".to_string(), Value::Null);
        options.apply(&second).unwrap();
        assert_eq!(options.subset.as_deref(), Some("web*"));
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        let mut options = defaults();
        let mut bag = OptionsBag::new();
        bag.insert("frobnicate".to_string(), json!("yes"));
        options.apply(&bag).unwrap();
    }

    #[test]
    fn single_inventory_source_becomes_a_list() {
        let mut options = defaults();
        let mut bag = OptionsBag::new();
        bag.insert("inventory".to_string(), json!("prod.yml"));
        options.apply(&bag).unwrap();
        assert_eq!(options.inventory, vec!["prod.yml".to_string()]);
    }

    #[test]
    fn passwords_come_from_the_call_bag() {
        let mut bag = OptionsBag::new();
        bag.insert("conn_pass".to_string(), json!("sekrit"));
        let passwords = Passwords::from_bag(&bag).unwrap();
        assert_eq!(passwords.conn_pass.as_deref(), Some("sekrit"));
        assert!(passwords.become_pass.is_none());
    }

    #[test]
    fn non_string_password_is_rejected() {
        let mut bag = OptionsBag::new();
        bag.insert("become_pass".to_string(), json!(123));
        assert!(Passwords::from_bag(&bag).is_err());
    }
}
