use ipnet::IpNet;
use std::fmt;

#[derive(Copy, Clone, Hash, PartialEq, Eq)]
pub struct IpPortRange(pub u16, pub u16);

impl fmt::Display for IpPortRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let &IpPortRange(ref from, ref to) = self;
        if from == to {
            write!(f, "{}", from)
        } else {
            write!(f, "{}-{}", from, to)
        }
    }
}

impl fmt::Debug for IpPortRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Copy, Clone, Hash, PartialEq, Eq)]
pub enum IpProtocol {
    Tcp(IpPortRange),
    Udp(IpPortRange),
    // ICMP scopes by message type/code instead of ports; -1 is the AWS wildcard
    Icmp { icmp_type: i64, icmp_code: i64 },
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &IpProtocol::Tcp(ref range) => write!(f, "{}/tcp", range),
            &IpProtocol::Udp(ref range) => write!(f, "{}/udp", range),
            &IpProtocol::Icmp {
                icmp_type,
                icmp_code,
            } => write!(f, "{}:{}/icmp", icmp_type, icmp_code),
        }
    }
}

impl fmt::Debug for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// ICMP echo request (ping).
pub const ICMP_ECHO_REQUEST: IpProtocol = IpProtocol::Icmp {
    icmp_type: 8,
    icmp_code: -1,
};

/// Every ICMP type and code.
pub const ICMP_ALL: IpProtocol = IpProtocol::Icmp {
    icmp_type: -1,
    icmp_code: -1,
};

#[derive(Copy, Clone, Hash, PartialEq, Eq)]
pub struct IpIngressRule(pub IpNet, pub IpProtocol);

impl fmt::Debug for IpIngressRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let &IpIngressRule(ref net, ref protocol) = self;
        write!(f, "{} -> {}", protocol, net)
    }
}
