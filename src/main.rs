extern crate chrono;
extern crate clap;
extern crate dirs;
#[macro_use]
extern crate failure;
extern crate futures;
extern crate hyper;
extern crate ipnet;
extern crate openssl_probe;
extern crate rusoto_core;
extern crate rusoto_ec2;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
#[cfg(test)]
extern crate tempfile;
extern crate tokio_core;

mod checkip;
mod cli;
mod cloud;
mod config;
mod iprules;
mod reconcile;
mod rules;

use checkip::CheckIp;
use checkip::IpSource;
use cli::Command;
use cloud::aws::AwsCloud;
use config::ConfigError;
use config::Configuration;
use failure::Error;
use ipnet::Ipv4Net;
use std::env;
use std::process;

fn main() {
    openssl_probe::init_ssl_cert_env_vars();
    if let Err(err) = run() {
        eprintln!("ERROR -> {}", err);
        process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let cmd = cli::parse_from_safe(env::args_os())?;

    if cmd == Command::MyIp {
        let addr = CheckIp.resolve()?;
        println!("{}", Ipv4Net::new(addr, 32).expect("32 is OK"));
        return Ok(());
    }

    let path = config::find_config(&config::search_dirs(), config::CONFIG_FILENAME)
        .ok_or(ConfigError::NotFound)?;
    let user_config = Configuration::from_path(&path)?;

    let cloud = AwsCloud::new(&user_config.credentials)?;
    cli::dispatch(cmd, &cloud, &user_config, CheckIp)
}
