/// Inputs for a RouterOS CPE script. Values are interpolated verbatim;
/// callers are expected to have validated them already.
#[derive(Debug, Clone)]
pub struct ScriptParams<'a> {
    pub product: &'a str,
    pub customer_name: &'a str,
    pub router_identity: &'a str,
    pub wan_interface: &'a str,
    pub lan_interface: &'a str,
    pub gateway_ip: &'a str,
    pub customer_ip: &'a str,
}

const DISABLED_SERVICES: &[&str] = &["www", "telnet", "ftp"];

/// Render the MikroTik configuration script for a customer router
pub fn build_device_script(p: &ScriptParams<'_>) -> String {
    let mut lines = vec![
        format!("/system identity set name=\"{}\"", p.router_identity),
        format!(
            "/interface ethernet set [find default-name={wan}] name={wan}",
            wan = p.wan_interface
        ),
        format!(
            "/interface ethernet set [find default-name={lan}] name={lan}",
            lan = p.lan_interface
        ),
        format!(
            "/ip address add address={}/30 interface={} comment=\"{} {} WAN\"",
            p.customer_ip, p.wan_interface, p.product, p.customer_name
        ),
        format!(
            "/ip route add dst-address=0.0.0.0/0 gateway={} comment=\"{} upstream\"",
            p.gateway_ip, p.product
        ),
        format!(
            "/ip firewall nat add chain=srcnat out-interface={} action=masquerade comment=\"{} NAT\"",
            p.wan_interface, p.product
        ),
        format!(
            "/ip dns set servers={},1.1.1.1 allow-remote-requests=yes",
            p.gateway_ip
        ),
    ];
    lines.extend(
        DISABLED_SERVICES
            .iter()
            .map(|svc| format!("/ip service set [find name={}] disabled=yes", svc)),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params<'a>(name: &'a str, identity: &'a str) -> ScriptParams<'a> {
        ScriptParams {
            product: "NetNova",
            customer_name: name,
            router_identity: identity,
            wan_interface: "ether1",
            lan_interface: "ether2",
            gateway_ip: "10.20.10.1",
            customer_ip: "10.20.10.2",
        }
    }

    #[test]
    fn test_full_script() {
        let script = build_device_script(&params("Acme Fiber", "NetNova-CPE-1"));
        let expected = [
            "/system identity set name=\"NetNova-CPE-1\"",
            "/interface ethernet set [find default-name=ether1] name=ether1",
            "/interface ethernet set [find default-name=ether2] name=ether2",
            "/ip address add address=10.20.10.2/30 interface=ether1 comment=\"NetNova Acme Fiber WAN\"",
            "/ip route add dst-address=0.0.0.0/0 gateway=10.20.10.1 comment=\"NetNova upstream\"",
            "/ip firewall nat add chain=srcnat out-interface=ether1 action=masquerade comment=\"NetNova NAT\"",
            "/ip dns set servers=10.20.10.1,1.1.1.1 allow-remote-requests=yes",
            "/ip service set [find name=www] disabled=yes",
            "/ip service set [find name=telnet] disabled=yes",
            "/ip service set [find name=ftp] disabled=yes",
        ]
        .join("\n");
        assert_eq!(script, expected);
    }

    #[test]
    fn test_content_invariants() {
        let mut p = params("Blue Wave Campus", "edge-7");
        p.wan_interface = "sfp1";
        let script = build_device_script(&p);

        let identity_lines = script
            .lines()
            .filter(|l| l.starts_with("/system identity set"))
            .count();
        assert_eq!(identity_lines, 1);

        let nat: Vec<&str> = script.lines().filter(|l| l.contains("masquerade")).collect();
        assert_eq!(nat.len(), 1);
        assert!(nat[0].contains("out-interface=sfp1"));

        for svc in ["www", "telnet", "ftp"] {
            assert!(script.contains(&format!("[find name={}] disabled=yes", svc)));
        }
        assert!(!script.ends_with('\n'));
    }
}
