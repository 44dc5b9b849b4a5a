mod firewall;
mod instance;

pub use cloud::mem::firewall::MemFirewall;
pub use cloud::mem::instance::MemInstance;
use cloud::Cloud;
use failure::Error;
use iprules::IpIngressRule;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;
use std::ops::Range;
use std::rc::Rc;
use std::u32;

pub struct MemCloud {
    state: Rc<RefCell<MemCloudState>>,
}

pub(super) struct MemCloudState {
    ids: Range<u32>,
    pub(super) firewalls: HashMap<String, Vec<IpIngressRule>>,
    pub(super) instances: HashMap<String, HashSet<String>>,
}

impl MemCloud {
    pub fn new() -> MemCloud {
        MemCloud {
            state: Rc::new(RefCell::new(MemCloudState {
                ids: 0..u32::MAX,
                firewalls: HashMap::new(),
                instances: HashMap::new(),
            })),
        }
    }

    pub fn create_firewall(&self) -> Result<MemFirewall, Error> {
        let mut state = self.state.borrow_mut();
        let id = format!("sg-{}", state.fresh_id()?);
        state.firewalls.insert(id.clone(), Vec::new());
        Ok(MemFirewall::new(id, Rc::clone(&self.state)))
    }

    pub fn create_instance(&self) -> Result<MemInstance, Error> {
        let mut state = self.state.borrow_mut();
        let id = format!("i-{}", state.fresh_id()?);
        state.instances.insert(id.clone(), HashSet::new());
        Ok(MemInstance::new(id, Rc::clone(&self.state)))
    }
}

impl MemCloudState {
    fn fresh_id(&mut self) -> Result<u32, Error> {
        self.ids.next().ok_or_else(|| format_err!("exhausted"))
    }
}

impl Cloud for MemCloud {
    type Firewall = MemFirewall;
    type Instance = MemInstance;

    fn firewall(&self, group_id: &str) -> MemFirewall {
        MemFirewall::new(group_id.to_owned(), Rc::clone(&self.state))
    }

    fn instance(&self, instance_id: &str) -> MemInstance {
        MemInstance::new(instance_id.to_owned(), Rc::clone(&self.state))
    }

    fn list_instances(&self) -> Result<Vec<MemInstance>, Error> {
        let state = self.state.borrow();
        let mut ids: Vec<&String> = state.instances.keys().collect();
        ids.sort();
        let xs = ids.into_iter()
            .map(|id| MemInstance::new(id.clone(), Rc::clone(&self.state)))
            .collect();
        Ok(xs)
    }
}
