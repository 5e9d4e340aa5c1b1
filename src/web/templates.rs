use std::borrow::Cow;

use chrono::{Datelike, Utc};

use crate::{
    auth::{AdminUser, gate::AdminRoute},
    web::i18n::Lang,
};

const SITE_BASE_STYLES: &str = r#"
        :root { color-scheme: light; --brand: #0f766e; --brand-dark: #115e59; --ink: #0f172a; --muted: #475569; }
        body { font-family: "Helvetica Neue", Arial, "Noto Naskh Arabic", sans-serif; margin: 0; background: #f8fafc; color: var(--ink); min-height: 100vh; display: flex; flex-direction: column; }
        header.site-header { background: #ffffff; border-bottom: 1px solid #e2e8f0; padding: 1rem clamp(1rem, 5vw, 3rem); display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; }
        .brand { font-size: 1.5rem; font-weight: 700; color: var(--brand); text-decoration: none; }
        nav.site-nav { display: flex; gap: 1.25rem; align-items: center; flex-wrap: wrap; }
        nav.site-nav a { color: var(--muted); text-decoration: none; font-weight: 600; }
        nav.site-nav a.active { color: var(--brand); }
        .lang-switch { border: 1px solid #cbd5e1; border-radius: 999px; padding: 0.35rem 0.9rem; }
        main { flex: 1; width: 100%; max-width: 1100px; margin: 0 auto; padding: clamp(1.5rem, 4vw, 3rem); box-sizing: border-box; }
        .hero { background: linear-gradient(135deg, #ccfbf1, #e0f2fe); border-radius: 24px; padding: clamp(2rem, 5vw, 3.5rem); margin-bottom: 2.5rem; }
        .hero h1 { margin-top: 0; font-size: clamp(1.9rem, 4vw, 2.8rem); }
        .hero p { color: var(--muted); font-size: 1.1rem; line-height: 1.7; max-width: 640px; }
        .actions { display: flex; gap: 1rem; flex-wrap: wrap; margin-top: 1.5rem; }
        .btn { display: inline-flex; align-items: center; gap: 0.4rem; padding: 0.85rem 1.4rem; border-radius: 12px; font-weight: 600; text-decoration: none; border: none; cursor: pointer; font-size: 1rem; }
        .btn-primary { background: var(--brand); color: #ffffff; }
        .btn-primary:hover { background: var(--brand-dark); }
        .btn-outline { background: #ffffff; color: var(--brand); border: 1px solid #99f6e4; }
        section { margin-bottom: 2.5rem; }
        .grid { display: grid; gap: 1.25rem; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); }
        .card { background: #ffffff; border: 1px solid #e2e8f0; border-radius: 16px; padding: 1.5rem; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.06); }
        .card h3 { margin-top: 0; }
        .card p { color: var(--muted); line-height: 1.6; margin-bottom: 0; }
        .chips { display: flex; flex-wrap: wrap; gap: 0.6rem; padding: 0; list-style: none; }
        .chips li { background: #f0fdfa; border: 1px solid #99f6e4; color: var(--brand-dark); padding: 0.4rem 0.9rem; border-radius: 999px; font-weight: 600; }
        .note { color: var(--muted); line-height: 1.7; }
        form.lead-form { display: grid; gap: 1rem; max-width: 560px; }
        label { font-weight: 600; display: block; margin-bottom: 0.35rem; }
        input, select, textarea { width: 100%; padding: 0.8rem; border-radius: 10px; border: 1px solid #cbd5e1; background: #ffffff; font-size: 1rem; box-sizing: border-box; font-family: inherit; }
        textarea { min-height: 110px; }
        .flash { padding: 1rem 1.25rem; border-radius: 10px; margin-bottom: 1.5rem; font-weight: 600; border: 1px solid transparent; }
        .flash.error { background: #fef2f2; border-color: #fecaca; color: #b91c1c; }
        .whatsapp-float { position: fixed; bottom: 1.5rem; inset-inline-end: 1.5rem; background: #25d366; color: #ffffff; border-radius: 999px; padding: 0.85rem 1.2rem; font-weight: 700; text-decoration: none; box-shadow: 0 12px 30px rgba(37, 211, 102, 0.35); }
        .app-footer { text-align: center; font-size: 0.9rem; color: #94a3b8; padding: 2rem 1rem 5rem; }
        .app-footer a { color: #64748b; margin: 0 0.5rem; }
        @media (max-width: 640px) {
            header.site-header { flex-direction: column; align-items: flex-start; }
        }
"#;

const ADMIN_BASE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; }
        header { background: #ffffff; padding: 1.25rem 1.5rem; border-bottom: 1px solid #e2e8f0; display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; }
        header h1 { margin: 0; font-size: 1.4rem; }
        nav.admin-nav { display: flex; gap: 0.5rem; flex-wrap: wrap; }
        nav.admin-nav a { color: #1d4ed8; text-decoration: none; font-weight: 600; padding: 0.45rem 0.9rem; border-radius: 999px; background: #eff6ff; border: 1px solid #bfdbfe; }
        nav.admin-nav a.active { background: #1d4ed8; color: #ffffff; }
        .session-info { color: #475569; font-size: 0.9rem; display: flex; gap: 0.75rem; align-items: center; }
        .session-info button { padding: 0.45rem 1rem; border-radius: 999px; }
        main { padding: 2rem 1.5rem; max-width: 1080px; margin: 0 auto; box-sizing: border-box; }
        .panel { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 1.5rem; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08); margin-bottom: 2rem; }
        .panel h2 { margin-top: 0; }
        label { display: block; margin-bottom: 0.4rem; font-weight: 600; }
        input, select, textarea { width: 100%; padding: 0.7rem; border-radius: 8px; border: 1px solid #cbd5e1; background: #f8fafc; box-sizing: border-box; font-family: inherit; font-size: 0.95rem; }
        textarea { min-height: 120px; }
        .field { margin-bottom: 1rem; }
        .inline-form { display: inline; }
        .row-form { display: flex; gap: 0.75rem; align-items: flex-end; }
        .row-form .field { flex: 1; margin-bottom: 0; }
        button { padding: 0.7rem 1.1rem; border: none; border-radius: 8px; background: #2563eb; color: #ffffff; font-weight: 600; cursor: pointer; }
        button:hover { background: #1d4ed8; }
        button.danger { background: #dc2626; }
        button.danger:hover { background: #b91c1c; }
        table { width: 100%; border-collapse: collapse; margin-top: 1rem; }
        th, td { padding: 0.65rem 0.85rem; border-bottom: 1px solid #e2e8f0; text-align: left; vertical-align: top; font-size: 0.93rem; }
        th { background: #f1f5f9; }
        .stats { display: grid; gap: 1rem; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); }
        .stat { background: #ffffff; border: 1px solid #e2e8f0; border-radius: 12px; padding: 1.25rem; }
        .stat strong { display: block; font-size: 2rem; }
        .tag { display: inline-block; background: #e0f2fe; color: #0369a1; border-radius: 999px; padding: 0.15rem 0.6rem; font-size: 0.8rem; margin: 0 0.25rem 0.25rem 0; text-decoration: none; }
        .muted { color: #64748b; }
        .flash { padding: 1rem 1.25rem; border-radius: 10px; margin-bottom: 1.5rem; font-weight: 600; border: 1px solid transparent; }
        .flash.success { background: #ecfdf3; border-color: #bbf7d0; color: #166534; }
        .flash.error { background: #fef2f2; border-color: #fecaca; color: #b91c1c; }
        .preview { white-space: pre-wrap; background: #f8fafc; border-radius: 8px; padding: 0.75rem; border: 1px dashed #cbd5e1; }
        .app-footer { margin-top: 3rem; text-align: center; font-size: 0.85rem; color: #94a3b8; }
"#;

const SESSION_WATCH_SCRIPT: &str = r#"<script>
(function () {
    if (!window.EventSource) { return; }
    var source = new EventSource('/admin/session/events');
    source.addEventListener('session', function (event) {
        var data = JSON.parse(event.data);
        if (data.kind === 'signed_out' || data.kind === 'expired') {
            source.close();
            window.location.href = '/admin/login?status=' + (data.kind === 'expired' ? 'expired' : 'logged_out');
        }
    });
})();
</script>"#;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum SiteNav {
    Home,
    Services,
    Contact,
    Legal,
}

pub struct SitePage<'a> {
    pub lang: Lang,
    pub path: &'a str,
    pub title: &'a str,
    pub active: SiteNav,
    pub body_html: Cow<'a, str>,
    pub whatsapp_href: &'a str,
}

pub fn render_site_page(page: SitePage<'_>) -> String {
    let SitePage {
        lang,
        path,
        title,
        active,
        body_html,
        whatsapp_href,
    } = page;
    let text = lang.text();

    let nav_link = |href: &str, label: &str, item: SiteNav| {
        format!(
            r#"<a href="{href}"{class}>{label}</a>"#,
            class = if item == active { r#" class="active""# } else { "" },
            label = escape_html(label),
        )
    };
    let nav = [
        nav_link("/", text.nav_home, SiteNav::Home),
        nav_link("/services", text.nav_services, SiteNav::Services),
        nav_link("/contact", text.nav_contact, SiteNav::Contact),
    ]
    .concat();

    let footer = render_footer(lang);

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang_code}" dir="{dir}">
<head>
    <meta charset="UTF-8">
    <title>{title} | {brand}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="{tagline}">
    <style>
{styles}
    </style>
</head>
<body>
    <header class="site-header">
        <a class="brand" href="/">{brand}</a>
        <nav class="site-nav">
            {nav}
            <a class="lang-switch" href="{path}?lang={other_code}" hreflang="{other_code}">{switch_label}</a>
        </nav>
    </header>
    <main>
{body_html}
    </main>
    {footer}
    <a class="whatsapp-float" href="{whatsapp_href}" target="_blank" rel="noopener">{whatsapp_label}</a>
</body>
</html>"#,
        lang_code = lang.code(),
        dir = lang.dir(),
        title = escape_html(title),
        brand = escape_html(text.brand),
        tagline = escape_html(text.tagline),
        styles = SITE_BASE_STYLES,
        nav = nav,
        path = escape_html(path),
        other_code = lang.other().code(),
        switch_label = escape_html(text.switch_language),
        body_html = body_html,
        footer = footer,
        whatsapp_href = escape_html(whatsapp_href),
        whatsapp_label = escape_html(text.cta_whatsapp),
    )
}

pub fn render_footer(lang: Lang) -> String {
    let text = lang.text();
    let current_year = Utc::now().year();
    format!(
        r#"<footer class="app-footer">© {year} {brand}. {rights}<br><a href="/privacy">{privacy}</a><a href="/terms">{terms}</a></footer>"#,
        year = current_year,
        brand = escape_html(text.brand),
        rights = escape_html(text.footer_rights),
        privacy = escape_html(text.footer_privacy),
        terms = escape_html(text.footer_terms),
    )
}

pub struct AdminPage<'a> {
    pub title: &'a str,
    pub user: &'a AdminUser,
    pub active: AdminRoute,
    pub flash_html: Cow<'a, str>,
    pub body_html: Cow<'a, str>,
}

pub fn render_admin_page(page: AdminPage<'_>) -> String {
    let AdminPage {
        title,
        user,
        active,
        flash_html,
        body_html,
    } = page;

    let nav = [
        ("/admin/dashboard", "Dashboard", AdminRoute::Dashboard),
        ("/admin/areas", "Areas", AdminRoute::Areas),
        ("/admin/services", "Services", AdminRoute::Services),
        ("/admin/templates", "Templates", AdminRoute::Templates),
        (
            "/admin/communications",
            "Communications",
            AdminRoute::Communications,
        ),
    ]
    .iter()
    .filter(|(_, _, route)| {
        route
            .required_role()
            .is_none_or(|required| user.role.satisfies(required))
    })
    .map(|(href, label, route)| {
        format!(
            r#"<a href="{href}"{class}>{label}</a>"#,
            class = if *route == active { r#" class="active""# } else { "" },
        )
    })
    .collect::<String>();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title} | Sahli Coordination Hub</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="noindex,nofollow">
    <style>
{styles}
    </style>
</head>
<body>
    <header>
        <h1>Sahli Coordination Hub</h1>
        <nav class="admin-nav">{nav}</nav>
        <div class="session-info">
            <span>{email} · {role}</span>
            <form class="inline-form" method="post" action="/admin/logout">
                <button type="submit">Sign out</button>
            </form>
        </div>
    </header>
    <main>
        <h2>{title}</h2>
        {flash_html}
{body_html}
        <footer class="app-footer">Sahli admin console</footer>
    </main>
{session_script}
</body>
</html>"#,
        title = escape_html(title),
        styles = ADMIN_BASE_STYLES,
        nav = nav,
        email = escape_html(&user.email),
        role = escape_html(user.role.label()),
        flash_html = flash_html,
        body_html = body_html,
        session_script = SESSION_WATCH_SCRIPT,
    )
}

/// Bare page for the signed-out admin views (login, forgot and reset password).
pub fn render_admin_auth_page(title: &str, flash_html: &str, form_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title} | Sahli Coordination Hub</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="noindex,nofollow">
    <style>
        :root {{ color-scheme: light; }}
        body {{ font-family: "Helvetica Neue", Arial, sans-serif; display: flex; align-items: center; justify-content: center; min-height: 100vh; margin: 0; background: #f1f5f9; color: #0f172a; padding: 1.5rem; box-sizing: border-box; }}
        main {{ width: 100%; max-width: 440px; }}
        .panel {{ background: #ffffff; padding: 2.25rem 2rem; border-radius: 18px; box-shadow: 0 20px 60px rgba(15, 23, 42, 0.08); border: 1px solid #e2e8f0; }}
        h1 {{ margin: 0 0 1.25rem; font-size: 1.6rem; text-align: center; }}
        label {{ display: block; margin-top: 1rem; font-weight: 600; }}
        input {{ width: 100%; padding: 0.8rem; margin-top: 0.5rem; border-radius: 10px; border: 1px solid #cbd5e1; background: #f8fafc; font-size: 1rem; box-sizing: border-box; }}
        button {{ margin-top: 1.75rem; width: 100%; padding: 0.9rem; border: none; border-radius: 10px; background: #2563eb; color: #ffffff; font-weight: 600; font-size: 1.05rem; cursor: pointer; }}
        button:hover {{ background: #1d4ed8; }}
        .links {{ margin-top: 1.25rem; text-align: center; font-size: 0.9rem; }}
        .links a {{ color: #1d4ed8; }}
        .flash {{ padding: 0.85rem 1rem; border-radius: 10px; margin-bottom: 1rem; font-weight: 600; border: 1px solid transparent; }}
        .flash.success {{ background: #ecfdf3; border-color: #bbf7d0; color: #166534; }}
        .flash.error {{ background: #fef2f2; border-color: #fecaca; color: #b91c1c; }}
    </style>
</head>
<body>
    <main>
        <section class="panel">
            <h1>{title}</h1>
            {flash_html}
            {form_html}
        </section>
    </main>
</body>
</html>"#,
        title = escape_html(title),
        flash_html = flash_html,
        form_html = form_html,
    )
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::auth::AdminRole;

    #[test]
    fn escape_html_covers_attribute_breakers() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn arabic_site_page_is_right_to_left() {
        let html = render_site_page(SitePage {
            lang: Lang::Ar,
            path: "/services",
            title: "الخدمات",
            active: SiteNav::Services,
            body_html: Cow::Borrowed("<p>body</p>"),
            whatsapp_href: "https://wa.me/97430000000",
        });
        assert!(html.contains(r#"<html lang="ar" dir="rtl">"#));
        assert!(html.contains(r#"href="/services?lang=en""#));
        assert!(html.contains("https://wa.me/97430000000"));
    }

    #[test]
    fn coordinator_nav_hides_super_admin_views() {
        let user = AdminUser {
            id: Uuid::nil(),
            email: "coord@sahli.co".to_string(),
            role: AdminRole::Coordinator,
            must_reset_password: false,
        };
        let html = render_admin_page(AdminPage {
            title: "Dashboard",
            user: &user,
            active: AdminRoute::Dashboard,
            flash_html: Cow::Borrowed(""),
            body_html: Cow::Borrowed(""),
        });
        assert!(html.contains("/admin/communications"));
        assert!(!html.contains("/admin/areas"));
        assert!(html.contains("EventSource('/admin/session/events')"));
    }
}
