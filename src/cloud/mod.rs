pub mod aws;
#[cfg(test)]
pub mod mem;

use failure::Error;
use iprules::IpIngressRule;
use std::collections::HashSet;
use std::fmt;

/// Narrow capability interface over the provider API, so the rule generator
/// and the instance reconciler can run against an in-memory implementation.
pub trait Cloud {
    type Firewall: Firewall;
    type Instance: Instance;

    /// Handle to a security group by id. Construction is cheap and does not
    /// validate the id; operations on a nonexistent group fail.
    fn firewall(&self, group_id: &str) -> Self::Firewall;

    /// Handle to an instance by id, same contract as `firewall`.
    fn instance(&self, instance_id: &str) -> Self::Instance;

    /// Every instance visible to the current credentials and region.
    fn list_instances(&self) -> Result<Vec<Self::Instance>, Error>;
}

pub trait Firewall: fmt::Debug {
    fn id(&self) -> &str;
    fn list_ingress_rules(&self) -> Result<Vec<IpIngressRule>, Error>;
    fn add_ingress_rules<'a, R>(&self, rules: R) -> Result<(), Error>
    where
        R: IntoIterator<Item = &'a IpIngressRule>;
    fn remove_ingress_rules<'a, R>(&self, rules: R) -> Result<(), Error>
    where
        R: IntoIterator<Item = &'a IpIngressRule>;
}

pub trait Instance: fmt::Debug {
    fn id(&self) -> &str;
    fn list_groups(&self) -> Result<HashSet<String>, Error>;
    fn set_groups(&self, groups: &HashSet<String>) -> Result<(), Error>;
}
