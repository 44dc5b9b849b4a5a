use cloud::Firewall;
use cloud::mem::MemCloudState;
use failure::Error;
use iprules::IpIngressRule;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub struct MemFirewall {
    id: String,
    state: Rc<RefCell<MemCloudState>>,
}

impl MemFirewall {
    pub(super) fn new(id: String, state: Rc<RefCell<MemCloudState>>) -> MemFirewall {
        MemFirewall { id, state }
    }
}

impl fmt::Debug for MemFirewall {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Firewall for MemFirewall {
    fn id(&self) -> &str {
        &self.id
    }

    fn list_ingress_rules(&self) -> Result<Vec<IpIngressRule>, Error> {
        let state = self.state.borrow();
        state
            .firewalls
            .get(&self.id)
            .cloned()
            .ok_or_else(|| format_err!("failed to find security group: {}", self.id))
    }

    fn add_ingress_rules<'a, R>(&self, rules: R) -> Result<(), Error>
    where
        R: IntoIterator<Item = &'a IpIngressRule>,
    {
        let mut state = self.state.borrow_mut();
        let id = self.id.clone();
        let existing = state
            .firewalls
            .get_mut(&id)
            .ok_or_else(|| format_err!("failed to find security group: {}", id))?;
        for rule in rules {
            if !existing.contains(rule) {
                existing.push(*rule);
            }
        }
        Ok(())
    }

    fn remove_ingress_rules<'a, R>(&self, rules: R) -> Result<(), Error>
    where
        R: IntoIterator<Item = &'a IpIngressRule>,
    {
        let mut state = self.state.borrow_mut();
        let id = self.id.clone();
        let existing = state
            .firewalls
            .get_mut(&id)
            .ok_or_else(|| format_err!("failed to find security group: {}", id))?;
        for rule in rules {
            existing.retain(|x| x != rule);
        }
        Ok(())
    }
}
