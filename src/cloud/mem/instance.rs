use cloud::Instance;
use cloud::mem::MemCloudState;
use failure::Error;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub struct MemInstance {
    id: String,
    state: Rc<RefCell<MemCloudState>>,
}

impl MemInstance {
    pub(super) fn new(id: String, state: Rc<RefCell<MemCloudState>>) -> MemInstance {
        MemInstance { id, state }
    }
}

impl fmt::Debug for MemInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Instance for MemInstance {
    fn id(&self) -> &str {
        &self.id
    }

    fn list_groups(&self) -> Result<HashSet<String>, Error> {
        let state = self.state.borrow();
        state
            .instances
            .get(&self.id)
            .cloned()
            .ok_or_else(|| format_err!("failed to find instance: {}", self.id))
    }

    fn set_groups(&self, groups: &HashSet<String>) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        let id = self.id.clone();
        let existing = state
            .instances
            .get_mut(&id)
            .ok_or_else(|| format_err!("failed to find instance: {}", id))?;
        *existing = groups.clone();
        Ok(())
    }
}
