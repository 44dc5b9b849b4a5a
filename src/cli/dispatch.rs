use checkip::IpSource;
use cli::Command;
use cloud::Cloud;
use config::Configuration;
use failure::Error;
use reconcile::InstanceOutcome;
use reconcile::InstanceReconciler;
use rules::RuleGenerator;

pub fn dispatch<C, S>(
    cmd: Command,
    cloud: &C,
    config: &Configuration,
    ip_source: S,
) -> Result<(), Error>
where
    C: Cloud,
    S: IpSource,
{
    match cmd {
        Command::Open => open(cloud, config, ip_source),
        Command::Close => close(cloud, config),
        // myip needs no config and is answered before one is loaded
        Command::MyIp => unreachable!(),
    }
}

fn open<C, S>(cloud: &C, config: &Configuration, ip_source: S) -> Result<(), Error>
where
    C: Cloud,
    S: IpSource,
{
    let fw = cloud.firewall(&config.group_id);
    let mut generator = RuleGenerator::new(&fw, config.ping, config.rules.clone(), ip_source);

    println!("Processing security group: {:?}", fw);

    println!("Clearing existing rules");
    generator.clear_all()?;

    println!("Generated rules: {:?}", generator.generate()?);

    println!("Uploading rules");
    generator.apply()?;

    println!("Attaching security group to instances");
    let mut reconciler = InstanceReconciler::new(cloud);
    let selected = reconciler.select_instances(&config.instance_ids)?.to_vec();
    println!("Selected instances: {:?}", selected);
    report(&reconciler.apply_group(&config.group_id))?;

    println!("Process completed: OK");
    Ok(())
}

fn close<C>(cloud: &C, config: &Configuration) -> Result<(), Error>
where
    C: Cloud,
{
    println!("Detaching security group from instances");
    let mut reconciler = InstanceReconciler::new(cloud);
    let selected = reconciler.select_instances(&config.instance_ids)?.to_vec();
    println!("Selected instances: {:?}", selected);
    report(&reconciler.revoke_group(&config.group_id))?;

    println!("Process completed: OK");
    Ok(())
}

fn report(outcomes: &[InstanceOutcome]) -> Result<(), Error> {
    for outcome in outcomes {
        match outcome.outcome {
            Ok(()) => println!("{}: OK", outcome.instance_id),
            Err(ref e) => println!("{}: FAILED: {}", outcome.instance_id, e),
        }
    }
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        bail!("failed to update {} of {} instances", failed, outcomes.len());
    }
    Ok(())
}
