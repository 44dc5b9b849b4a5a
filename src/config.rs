use failure::Error;
use iprules::IpPortRange;
use iprules::IpProtocol;
use serde_json;
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

pub const CONFIG_FILENAME: &str = "config.json";

#[derive(Fail, Debug, PartialEq)]
pub enum ConfigError {
    #[fail(display = "no config.json found in any search directory")]
    NotFound,
    #[fail(display = "missing required config field: {}", _0)]
    MissingField(&'static str),
}

/// AWS credential tuple, resolved from the environment or the config file.
///
/// `Credentials::default()` (all fields absent) is the sentinel an
/// environment tuple is compared against: if any of the four variables is
/// set, the environment tuple wins wholesale and the file values are ignored
/// entirely. The two sources are never merged field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub profile: Option<String>,
    pub region: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Credentials {
        Credentials {
            access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            profile: env::var("AWS_PROFILE").ok(),
            region: env::var("AWS_DEFAULT_REGION").ok(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Credentials::default()
    }

    pub fn resolve(env_creds: Credentials, file_creds: Credentials) -> Credentials {
        if !env_creds.is_empty() {
            env_creds
        } else {
            file_creds
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfigDoc {
    #[serde(rename = "EC2_Instance_Ids")]
    instance_ids: Option<Vec<String>>,
    #[serde(rename = "Security_Group")]
    security_group: Option<SecurityGroupDoc>,
    #[serde(rename = "AWS_ACCESS_KEY_ID")]
    access_key_id: Option<String>,
    #[serde(rename = "AWS_SECRET_ACCESS_KEY")]
    secret_access_key: Option<String>,
    #[serde(rename = "AWS_PROFILE")]
    profile: Option<String>,
    #[serde(rename = "AWS_DEFAULT_REGION")]
    region: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SecurityGroupDoc {
    #[serde(rename = "Id")]
    id: Option<String>,
    #[serde(rename = "Ping")]
    ping: Option<bool>,
    #[serde(rename = "RulesIN")]
    rules_in: Option<Vec<RuleDoc>>,
}

#[derive(Debug, Deserialize)]
struct RuleDoc {
    #[serde(rename = "Protocol")]
    protocol: String,
    #[serde(rename = "FromPort")]
    from_port: i64,
    #[serde(rename = "ToPort")]
    to_port: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub credentials: Credentials,
    pub group_id: String,
    pub ping: bool,
    pub rules: Vec<IpProtocol>,
    pub instance_ids: Vec<String>,
}

impl Configuration {
    pub fn from_path(path: &Path) -> Result<Configuration, Error> {
        let mut content = String::new();
        File::open(path)?.read_to_string(&mut content)?;
        let doc: ConfigDoc = serde_json::from_str(&content)?;
        Configuration::from_doc(doc, Credentials::from_env())
    }

    pub fn from_doc(doc: ConfigDoc, env_creds: Credentials) -> Result<Configuration, Error> {
        let sg = doc.security_group
            .ok_or(ConfigError::MissingField("Security_Group"))?;
        let group_id = sg.id.ok_or(ConfigError::MissingField("Security_Group.Id"))?;
        let ping = sg.ping
            .ok_or(ConfigError::MissingField("Security_Group.Ping"))?;
        let rule_docs = sg.rules_in
            .ok_or(ConfigError::MissingField("Security_Group.RulesIN"))?;

        let rules = rule_docs
            .iter()
            .map(to_protocol)
            .collect::<Result<Vec<_>, Error>>()?;

        let file_creds = Credentials {
            access_key_id: doc.access_key_id,
            secret_access_key: doc.secret_access_key,
            profile: doc.profile,
            region: doc.region,
        };

        Ok(Configuration {
            credentials: Credentials::resolve(env_creds, file_creds),
            group_id,
            ping,
            rules,
            instance_ids: doc.instance_ids.unwrap_or_default(),
        })
    }
}

fn to_protocol(doc: &RuleDoc) -> Result<IpProtocol, Error> {
    match doc.protocol.as_str() {
        "tcp" => Ok(IpProtocol::Tcp(to_port_range(doc)?)),
        "udp" => Ok(IpProtocol::Udp(to_port_range(doc)?)),
        "icmp" => Ok(IpProtocol::Icmp {
            icmp_type: doc.from_port,
            icmp_code: doc.to_port,
        }),
        other => bail!("unsupported protocol in RulesIN: {}", other),
    }
}

fn to_port_range(doc: &RuleDoc) -> Result<IpPortRange, Error> {
    Ok(IpPortRange(to_port(doc.from_port)?, to_port(doc.to_port)?))
}

fn to_port(port: i64) -> Result<u16, Error> {
    if port < 0 || port > i64::from(u16::max_value()) {
        bail!("port out of range in RulesIN: {}", port);
    }
    Ok(port as u16)
}

/// Candidate directories, searched in order: the working directory, the
/// operator's `~/.portcullis/`, then `/etc/`.
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(home) = ::dirs::home_dir() {
        dirs.push(home.join(".portcullis"));
    }
    dirs.push(PathBuf::from("/etc"));
    dirs
}

pub fn find_config<P: AsRef<Path>>(dirs: &[P], filename: &str) -> Option<PathBuf> {
    for dir in dirs {
        let candidate = dir.as_ref().join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use iprules::ICMP_ECHO_REQUEST;
    use std::fs;
    use tempfile::tempdir;

    fn doc(json: &str) -> ConfigDoc {
        serde_json::from_str(json).unwrap()
    }

    fn full_creds(tag: &str) -> Credentials {
        Credentials {
            access_key_id: Some(format!("{}-key", tag)),
            secret_access_key: Some(format!("{}-secret", tag)),
            profile: Some(format!("{}-profile", tag)),
            region: Some("eu-west-1".to_owned()),
        }
    }

    #[test]
    fn test_full_document() {
        let config = Configuration::from_doc(
            doc(r#"{
                "EC2_Instance_Ids": ["i-0aa", "i-0bb"],
                "Security_Group": {
                    "Id": "sg-1",
                    "Ping": true,
                    "RulesIN": [
                        {"Protocol": "tcp", "FromPort": 22, "ToPort": 22},
                        {"Protocol": "udp", "FromPort": 60000, "ToPort": 61000},
                        {"Protocol": "icmp", "FromPort": 8, "ToPort": -1}
                    ]
                }
            }"#),
            Credentials::default(),
        ).unwrap();

        assert_eq!(config.group_id, "sg-1");
        assert_eq!(config.ping, true);
        assert_eq!(config.instance_ids, vec!["i-0aa", "i-0bb"]);
        assert_eq!(
            config.rules,
            vec![
                IpProtocol::Tcp(IpPortRange(22, 22)),
                IpProtocol::Udp(IpPortRange(60_000, 61_000)),
                ICMP_ECHO_REQUEST,
            ]
        );
    }

    #[test]
    fn test_instance_ids_default_to_empty() {
        let config = Configuration::from_doc(
            doc(r#"{"Security_Group": {"Id": "sg-1", "Ping": false, "RulesIN": []}}"#),
            Credentials::default(),
        ).unwrap();
        assert_eq!(config.instance_ids, Vec::<String>::new());
        assert_eq!(config.rules, vec![]);
    }

    #[test]
    fn test_missing_fields() {
        let cases = &[
            (r#"{}"#, "Security_Group"),
            (
                r#"{"Security_Group": {"Ping": true, "RulesIN": []}}"#,
                "Security_Group.Id",
            ),
            (
                r#"{"Security_Group": {"Id": "sg-1", "RulesIN": []}}"#,
                "Security_Group.Ping",
            ),
            (
                r#"{"Security_Group": {"Id": "sg-1", "Ping": true}}"#,
                "Security_Group.RulesIN",
            ),
        ];
        for &(json, field) in cases {
            let err = Configuration::from_doc(doc(json), Credentials::default()).unwrap_err();
            assert_eq!(
                err.downcast_ref::<ConfigError>(),
                Some(&ConfigError::MissingField(field)),
                "for document: {}",
                json
            );
        }
    }

    #[test]
    fn test_unsupported_protocol() {
        let err = Configuration::from_doc(
            doc(r#"{"Security_Group": {"Id": "sg-1", "Ping": false, "RulesIN": [
                {"Protocol": "gre", "FromPort": 0, "ToPort": 0}
            ]}}"#),
            Credentials::default(),
        ).unwrap_err();
        assert!(err.to_string().contains("unsupported protocol"));
    }

    #[test]
    fn test_port_out_of_range() {
        let err = Configuration::from_doc(
            doc(r#"{"Security_Group": {"Id": "sg-1", "Ping": false, "RulesIN": [
                {"Protocol": "tcp", "FromPort": -1, "ToPort": 22}
            ]}}"#),
            Credentials::default(),
        ).unwrap_err();
        assert!(err.to_string().contains("port out of range"));
    }

    #[test]
    fn test_env_credentials_win_wholesale() {
        // even a single env var set means the file tuple is ignored entirely
        let env_creds = Credentials {
            profile: Some("ops".to_owned()),
            ..Credentials::default()
        };
        let resolved = Credentials::resolve(env_creds.clone(), full_creds("file"));
        assert_eq!(resolved, env_creds);
        assert_eq!(resolved.access_key_id, None);
    }

    #[test]
    fn test_file_credentials_used_when_env_is_empty() {
        let resolved = Credentials::resolve(Credentials::default(), full_creds("file"));
        assert_eq!(resolved, full_creds("file"));
    }

    #[test]
    fn test_file_credentials_come_from_document() {
        let config = Configuration::from_doc(
            doc(r#"{
                "AWS_ACCESS_KEY_ID": "AKIATEST",
                "AWS_SECRET_ACCESS_KEY": "secret",
                "AWS_DEFAULT_REGION": "eu-central-1",
                "Security_Group": {"Id": "sg-1", "Ping": false, "RulesIN": []}
            }"#),
            Credentials::default(),
        ).unwrap();
        assert_eq!(config.credentials.access_key_id.as_ref().unwrap(), "AKIATEST");
        assert_eq!(config.credentials.profile, None);
        assert_eq!(config.credentials.region.as_ref().unwrap(), "eu-central-1");
    }

    #[test]
    fn test_find_config_first_match_wins() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(second.path().join(CONFIG_FILENAME), "{}").unwrap();

        // only the second dir has a config
        let found = find_config(&[first.path(), second.path()], CONFIG_FILENAME).unwrap();
        assert_eq!(found, second.path().join(CONFIG_FILENAME));

        // once the first dir has one too, it shadows the second
        fs::write(first.path().join(CONFIG_FILENAME), "{}").unwrap();
        let found = find_config(&[first.path(), second.path()], CONFIG_FILENAME).unwrap();
        assert_eq!(found, first.path().join(CONFIG_FILENAME));
    }

    #[test]
    fn test_find_config_none() {
        let empty = tempdir().unwrap();
        assert_eq!(find_config(&[empty.path()], CONFIG_FILENAME), None);
    }
}
