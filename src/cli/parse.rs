use clap::App;
use clap::AppSettings;
use clap::SubCommand;
use cli::Command;
use failure::Error;
use std::ffi::OsString;

fn define_app<'a, 'b>() -> App<'a, 'b> {
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .setting(AppSettings::GlobalVersion)
        .setting(AppSettings::VersionlessSubcommands)
        .setting(AppSettings::DeriveDisplayOrder)
        .subcommand(
            SubCommand::with_name("myip")
                .about("Print the current external IP address in CIDR notation"),
        )
        .subcommand(SubCommand::with_name("open").about(
            "Replace the security group's ingress rules with ones scoped to \
             the current external IP, then attach the group to the instances",
        ))
        .subcommand(
            SubCommand::with_name("close")
                .about("Detach the security group from the instances"),
        )
}

pub fn parse_from_safe<I, T>(args: I) -> Result<Command, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let app = define_app();
    let matches = app.get_matches_from_safe(args)?;

    let cmd = match matches.subcommand_name() {
        Some("myip") => Command::MyIp,
        Some("open") => Command::Open,
        Some("close") => Command::Close,
        _ => unreachable!(),
    };

    Ok(cmd)
}
