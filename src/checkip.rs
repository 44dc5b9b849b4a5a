use failure::Error;
use failure::ResultExt;
use futures;
use futures::Future;
use futures::Stream;
use hyper::Client;
use hyper::StatusCode;
use std::net::Ipv4Addr;
use std::str;
use std::str::FromStr;
use tokio_core::reactor::Core;

/// Source of the caller's external IPv4 address.
///
/// Injected into the rule generator so tests can substitute a fixed address
/// for the network lookup.
pub trait IpSource {
    fn resolve(&self) -> Result<Ipv4Addr, Error>;
}

impl<'a, S: IpSource> IpSource for &'a S {
    fn resolve(&self) -> Result<Ipv4Addr, Error> {
        S::resolve(self)
    }
}

/// Resolves the external address via checkip.amazonaws.com.
pub struct CheckIp;

impl IpSource for CheckIp {
    fn resolve(&self) -> Result<Ipv4Addr, Error> {
        let mut core = Core::new().context("failed to create core reactor")?;
        let client = Client::new(&core.handle());
        let uri = "http://checkip.amazonaws.com/".parse().expect("valid URL");
        let (status, body) = core.run(
            client
                .get(uri)
                .and_then(|res| (futures::finished(res.status()), res.body().concat2())),
        ).context("failed to contact checkip service")?;
        let content = str::from_utf8(&*body).context("expected checkip to return UTF8")?;
        if status != StatusCode::Ok {
            bail!("checkip service returned {}: {}", status, content);
        }
        let ip_addr = Ipv4Addr::from_str(content.trim_right())
            .with_context(|_e| format!("expected checkip to return IP address: {}", content))?;
        Ok(ip_addr)
    }
}
