//! Crawler-facing documents for the marketing site.

/// A public marketing page listed in the sitemap.
#[derive(Debug, Clone, Copy)]
pub struct MarketingRoute {
    pub path: &'static str,
    pub change_frequency: &'static str,
    pub priority: f32,
}

pub const MARKETING_ROUTES: &[MarketingRoute] = &[
    MarketingRoute { path: "/", change_frequency: "weekly", priority: 1.0 },
    MarketingRoute { path: "/about", change_frequency: "monthly", priority: 0.8 },
    MarketingRoute { path: "/programs", change_frequency: "weekly", priority: 0.9 },
    MarketingRoute { path: "/pricing", change_frequency: "weekly", priority: 0.9 },
    MarketingRoute { path: "/testimonials", change_frequency: "monthly", priority: 0.7 },
    MarketingRoute { path: "/faq", change_frequency: "monthly", priority: 0.6 },
    MarketingRoute { path: "/contact", change_frequency: "yearly", priority: 0.6 },
    MarketingRoute { path: "/legal/privacy", change_frequency: "yearly", priority: 0.3 },
    MarketingRoute { path: "/legal/terms", change_frequency: "yearly", priority: 0.3 },
];

/// Paths crawlers must stay out of.
pub const DISALLOWED_PATHS: &[&str] = &["/api/", "/dashboard"];

pub fn render_sitemap(base_url: &str, last_modified: chrono::NaiveDate) -> String {
    let base = base_url.trim_end_matches('/');
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    for route in MARKETING_ROUTES {
        let loc = if route.path == "/" {
            base.to_string()
        } else {
            format!("{}{}", base, route.path)
        };
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
            escape_xml(&loc),
            last_modified.format("%Y-%m-%d"),
            route.change_frequency,
            route.priority
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}

pub fn render_robots(base_url: &str) -> String {
    let mut robots = String::from("User-agent: *\nAllow: /\n");
    for path in DISALLOWED_PATHS {
        robots.push_str(&format!("Disallow: {}\n", path));
    }
    robots.push_str(&format!(
        "\nSitemap: {}/sitemap.xml\n",
        base_url.trim_end_matches('/')
    ));
    robots
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
