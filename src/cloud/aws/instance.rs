use cloud::Instance;
use failure::Error;
use failure::ResultExt;
use rusoto_ec2::DescribeInstanceAttributeRequest;
use rusoto_ec2::DescribeInstancesRequest;
use rusoto_ec2::Ec2;
use rusoto_ec2::ModifyInstanceAttributeRequest;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

pub struct AwsInstance {
    id: String,
    client: Rc<Ec2>,
}

impl AwsInstance {
    pub(super) fn new(id: String, client: Rc<Ec2>) -> AwsInstance {
        AwsInstance { id, client }
    }

    pub(super) fn list(client: &Rc<Ec2>) -> Result<Vec<AwsInstance>, Error> {
        let req = DescribeInstancesRequest {
            ..Default::default()
        };
        let resp = client
            .describe_instances(&req)
            .with_context(|_e| format!("failed to describe instances: {:?}", req))?;
        let mut values: Vec<AwsInstance> = Vec::new();
        for r in resp.reservations.unwrap() {
            for i in r.instances.unwrap() {
                let value = AwsInstance {
                    id: i.instance_id.unwrap(),
                    client: Rc::clone(client),
                };
                values.push(value);
            }
        }
        Ok(values)
    }
}

impl fmt::Debug for AwsInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Instance for AwsInstance {
    fn id(&self) -> &str {
        &self.id
    }

    fn list_groups(&self) -> Result<HashSet<String>, Error> {
        let req = DescribeInstanceAttributeRequest {
            attribute: "groupSet".to_owned(),
            instance_id: self.id.clone(),
            ..Default::default()
        };
        let resp = self.client
            .describe_instance_attribute(&req)
            .with_context(|_e| format!("failed to describe groups for instance: {}", self.id))?;
        let groups = resp.groups
            .unwrap_or_default()
            .into_iter()
            .map(|g| g.group_id.unwrap())
            .collect();
        Ok(groups)
    }

    fn set_groups(&self, groups: &HashSet<String>) -> Result<(), Error> {
        let req = ModifyInstanceAttributeRequest {
            instance_id: self.id.clone(),
            groups: Some(groups.iter().cloned().collect()),
            ..Default::default()
        };
        self.client
            .modify_instance_attribute(&req)
            .with_context(|_e| format!("failed to modify groups for instance: {}", self.id))?;
        Ok(())
    }
}
