use cloud::Cloud;
use cloud::Instance;
use failure::Error;
use std::collections::HashSet;

/// Result of one instance's membership update. Provider errors are captured
/// here instead of aborting the rest of the batch.
#[derive(Debug)]
pub struct InstanceOutcome {
    pub instance_id: String,
    pub outcome: Result<(), Error>,
}

impl InstanceOutcome {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Attaches a security group to (or detaches it from) a set of instances.
///
/// Each update is fetch-edit-push on the instance's live group membership:
/// the current set is read, the group id added or removed, and the whole set
/// written back. Instances are processed independently and sequentially.
pub struct InstanceReconciler<'a, C: Cloud + 'a> {
    cloud: &'a C,
    instance_ids: Vec<String>,
}

impl<'a, C: Cloud> InstanceReconciler<'a, C> {
    pub fn new(cloud: &'a C) -> InstanceReconciler<'a, C> {
        InstanceReconciler {
            cloud,
            instance_ids: Vec::new(),
        }
    }

    /// An explicit non-empty id list is used verbatim; otherwise every
    /// instance visible to the credentials is enumerated. The selection is
    /// cached for the reconciler's subsequent operations.
    pub fn select_instances(&mut self, explicit_ids: &[String]) -> Result<&[String], Error> {
        if !explicit_ids.is_empty() {
            self.instance_ids = explicit_ids.to_vec();
        } else {
            let instances = self.cloud.list_instances()?;
            self.instance_ids = instances.iter().map(|i| i.id().to_owned()).collect();
        }
        Ok(&self.instance_ids)
    }

    pub fn apply_group(&self, group_id: &str) -> Vec<InstanceOutcome> {
        self.update_each(group_id, |groups, gid| {
            groups.insert(gid.to_owned());
        })
    }

    /// Removing the group from an instance that does not carry it is a
    /// no-op: the unchanged set is pushed back, so revoking twice is safe.
    pub fn revoke_group(&self, group_id: &str) -> Vec<InstanceOutcome> {
        self.update_each(group_id, |groups, gid| {
            groups.remove(gid);
        })
    }

    fn update_each<E>(&self, group_id: &str, edit: E) -> Vec<InstanceOutcome>
    where
        E: Fn(&mut HashSet<String>, &str),
    {
        let mut outcomes = Vec::new();
        for instance_id in &self.instance_ids {
            let outcome = self.update_one(instance_id, group_id, &edit);
            outcomes.push(InstanceOutcome {
                instance_id: instance_id.clone(),
                outcome,
            });
        }
        outcomes
    }

    fn update_one<E>(&self, instance_id: &str, group_id: &str, edit: &E) -> Result<(), Error>
    where
        E: Fn(&mut HashSet<String>, &str),
    {
        let instance = self.cloud.instance(instance_id);
        let mut groups = instance.list_groups()?;
        edit(&mut groups, group_id);
        instance.set_groups(&groups)
    }
}
