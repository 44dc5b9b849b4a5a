use checkip::IpSource;
use cloud::Firewall;
use failure::Error;
use ipnet::IpNet;
use ipnet::Ipv4Net;
use iprules::ICMP_ALL;
use iprules::ICMP_ECHO_REQUEST;
use iprules::IpIngressRule;
use iprules::IpProtocol;

/// Computes the desired ingress rule set for one security group and pushes
/// it to the provider.
///
/// Generation follows a generate-once contract: the first call to
/// `generate` resolves the external IP and builds the set, every later call
/// returns the same cached slice, even if the inputs were mutated in the
/// meantime. The external IP is likewise resolved at most once per
/// generator.
pub struct RuleGenerator<'a, F: Firewall + 'a, S: IpSource> {
    firewall: &'a F,
    ping: bool,
    protocols: Vec<IpProtocol>,
    ip_source: S,
    external_ip: Option<IpNet>,
    request_set: Option<Vec<IpIngressRule>>,
}

impl<'a, F: Firewall, S: IpSource> RuleGenerator<'a, F, S> {
    pub fn new(
        firewall: &'a F,
        ping: bool,
        protocols: Vec<IpProtocol>,
        ip_source: S,
    ) -> RuleGenerator<'a, F, S> {
        RuleGenerator {
            firewall,
            ping,
            protocols,
            ip_source,
            external_ip: None,
            request_set: None,
        }
    }

    /// The caller's external address as a `/32` network, resolved on first
    /// use and cached for the generator's lifetime.
    pub fn external_ip(&mut self) -> Result<IpNet, Error> {
        if let Some(ip) = self.external_ip {
            return Ok(ip);
        }
        let addr = self.ip_source.resolve()?;
        let cidr = IpNet::V4(Ipv4Net::new(addr, 32).expect("32 is OK"));
        self.external_ip = Some(cidr);
        Ok(cidr)
    }

    /// Builds the rule set on first call: two ICMP ping rules when ping is
    /// enabled, then one rule per configured protocol, all scoped to the
    /// external `/32`.
    pub fn generate(&mut self) -> Result<&[IpIngressRule], Error> {
        if self.request_set.is_none() {
            let source = self.external_ip()?;
            let mut rules = Vec::new();
            if self.ping {
                rules.push(IpIngressRule(source, ICMP_ECHO_REQUEST));
                rules.push(IpIngressRule(source, ICMP_ALL));
            }
            for protocol in &self.protocols {
                rules.push(IpIngressRule(source, *protocol));
            }
            self.request_set = Some(rules);
        }
        Ok(self.request_set.as_ref().expect("generated above"))
    }

    /// The rules currently active on the group, straight from the provider.
    pub fn fetch_current(&self) -> Result<Vec<IpIngressRule>, Error> {
        self.firewall.list_ingress_rules()
    }

    /// Revokes every rule currently on the group. A group with no rules is
    /// left untouched (no revoke request is issued).
    pub fn clear_all(&self) -> Result<(), Error> {
        let full_set = self.fetch_current()?;
        if full_set.is_empty() {
            return Ok(());
        }
        self.firewall.remove_ingress_rules(&full_set)
    }

    /// Generates if needed, then authorizes the generated set on the group.
    pub fn apply(&mut self) -> Result<(), Error> {
        self.generate()?;
        let rules = self.request_set.as_ref().expect("generated above");
        self.firewall.add_ingress_rules(rules)
    }
}
