//! Reverse-proxy configuration: render a per-application Nginx
//! site, enable it, and reload only after the full config
//! validates.

use crate::config::Identifiers;
use crate::error::{DeployError, DeployResult};
use crate::ssh::SshSession;

/// Render a server block that listens on port 80 and proxies
/// every path to the loopback-bound application port.
#[must_use]
pub fn render(server_name: &str, app_port: u16) -> String {
    format!(
        "server {{\n\
         \tlisten 80;\n\
         \tserver_name {server_name};\n\
         \n\
         \tlocation / {{\n\
         \t\tproxy_pass http://127.0.0.1:{app_port};\n\
         \t\tproxy_set_header Host $host;\n\
         \t\tproxy_set_header X-Real-IP $remote_addr;\n\
         \t\tproxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;\n\
         \t\tproxy_set_header X-Forwarded-Proto $scheme;\n\
         \t}}\n\
         }}\n"
    )
}

/// Write the site file, enable it, drop the distribution default
/// site, validate, and reload. A failed `nginx -t` aborts before
/// the reload so already-running sites stay untouched.
pub fn configure(
    ssh: &SshSession,
    ids: &Identifiers,
    server_name: &str,
    app_port: u16,
) -> DeployResult<()> {
    let site = render(server_name, app_port);
    let site_file = ids.nginx_site_file();
    let enabled_link = ids.nginx_enabled_link();

    tracing::info!("writing nginx site {site_file}");
    ssh.exec_with_stdin(&format!("sudo tee {site_file} >/dev/null"), &site)
        .map_err(|e| DeployError::Proxy(format!("could not write site file: {e}")))?;

    ssh.exec(&format!("sudo ln -sf {site_file} {enabled_link}"))
        .map_err(|e| DeployError::Proxy(format!("could not enable site: {e}")))?;

    ssh.exec("sudo rm -f /etc/nginx/sites-enabled/default")
        .map_err(|e| DeployError::Proxy(format!("could not remove default site: {e}")))?;

    ssh.exec("sudo nginx -t").map_err(|_| {
        DeployError::Proxy("generated configuration failed nginx -t, not reloading".to_string())
    })?;

    ssh.exec("sudo systemctl reload nginx")
        .map_err(|e| DeployError::Proxy(format!("nginx reload failed: {e}")))?;

    tracing::info!("nginx proxying port 80 -> 127.0.0.1:{app_port}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::render;

    #[test]
    fn full_site() {
        let site = render("203.0.113.9", 5000);

        assert!(site.starts_with("server {"));
        assert!(site.contains("listen 80;"));
        assert!(site.contains("server_name 203.0.113.9;"));
        assert!(site.contains("proxy_pass http://127.0.0.1:5000;"));
        assert!(site.contains("proxy_set_header Host $host;"));
        assert!(site.contains("proxy_set_header X-Real-IP $remote_addr;"));
        assert!(site.contains("proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;"));
        assert!(site.contains("proxy_set_header X-Forwarded-Proto $scheme;"));
        assert!(site.trim_end().ends_with('}'));
    }

    #[test]
    fn port_and_host_vary() {
        let a = render("app.example.com", 3000);
        let b = render("app.example.com", 8080);

        assert!(a.contains(":3000;"));
        assert!(b.contains(":8080;"));
        assert!(a.contains("server_name app.example.com;"));
    }

    #[test]
    fn braces_balance() {
        let site = render("h", 80);
        let open = site.matches('{').count();
        let close = site.matches('}').count();
        assert_eq!(open, close);
    }
}
