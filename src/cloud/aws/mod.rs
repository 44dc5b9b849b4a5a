use chrono::Duration;
use chrono::Utc;
use cloud::Cloud;
use cloud::aws::firewall::AwsFirewall;
use cloud::aws::instance::AwsInstance;
use config::Credentials;
use failure::Error;
use failure::ResultExt;
use rusoto_core::AwsCredentials;
use rusoto_core::CredentialsError;
use rusoto_core::DefaultCredentialsProvider;
use rusoto_core::ProfileProvider;
use rusoto_core::ProvideAwsCredentials;
use rusoto_core::Region;
use rusoto_core::default_tls_client;
use rusoto_ec2::Ec2;
use rusoto_ec2::Ec2Client;
use std::rc::Rc;
use std::result;
use std::str::FromStr;

mod firewall;
mod instance;

pub struct AwsCloud {
    client: Rc<Ec2>,
}

impl AwsCloud {
    /// Builds an EC2 client from the resolved credential tuple: explicit
    /// keys win, then a named profile, then the SDK's default chain.
    pub fn new(creds: &Credentials) -> Result<AwsCloud, Error> {
        let region = AwsCloud::region(creds)?;
        let client: Rc<Ec2> = match (&creds.access_key_id, &creds.secret_access_key) {
            (&Some(ref key), &Some(ref secret)) => {
                let tls_client = default_tls_client().context("could not create TLS client")?;
                let provider = ConfigCredentialsProvider {
                    key: key.clone(),
                    secret: secret.clone(),
                };
                Rc::new(Ec2Client::new(tls_client, provider, region))
            }
            _ => {
                let tls_client = default_tls_client().context("could not create TLS client")?;
                match creds.profile {
                    Some(ref profile) => {
                        let mut provider =
                            ProfileProvider::new().context("could not create profile provider")?;
                        provider.set_profile(profile.as_str());
                        Rc::new(Ec2Client::new(tls_client, provider, region))
                    }
                    None => {
                        let provider = DefaultCredentialsProvider::new()
                            .context("could not create credentials provider")?;
                        Rc::new(Ec2Client::new(tls_client, provider, region))
                    }
                }
            }
        };
        Ok(AwsCloud { client })
    }

    fn region(creds: &Credentials) -> Result<Region, Error> {
        let region_str = creds.region.as_ref().ok_or_else(|| {
            format_err!("no region configured: set AWS_DEFAULT_REGION in the environment or the config file")
        })?;
        let region = Region::from_str(region_str)
            .with_context(|_e| format!("invalid region: {}", region_str))?;
        Ok(region)
    }
}

impl Cloud for AwsCloud {
    type Firewall = AwsFirewall;
    type Instance = AwsInstance;

    fn firewall(&self, group_id: &str) -> AwsFirewall {
        AwsFirewall::new(group_id.to_owned(), Rc::clone(&self.client))
    }

    fn instance(&self, instance_id: &str) -> AwsInstance {
        AwsInstance::new(instance_id.to_owned(), Rc::clone(&self.client))
    }

    fn list_instances(&self) -> Result<Vec<AwsInstance>, Error> {
        AwsInstance::list(&self.client)
    }
}

/// Serves the keys taken from the config file or the environment. rusoto
/// 0.31 has no static provider, so this stands in for one; the expiry only
/// controls when rusoto asks again.
struct ConfigCredentialsProvider {
    key: String,
    secret: String,
}

impl ProvideAwsCredentials for ConfigCredentialsProvider {
    fn credentials(&self) -> result::Result<AwsCredentials, CredentialsError> {
        Ok(AwsCredentials::new(
            self.key.clone(),
            self.secret.clone(),
            None,
            Utc::now() + Duration::minutes(15),
        ))
    }
}
