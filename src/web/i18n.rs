use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use serde::Deserialize;

pub const LANG_COOKIE: &str = "sahli_lang";
const LANG_COOKIE_DAYS: i64 = 365;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Ar,
}

impl Lang {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Lang::En),
            "ar" => Some(Lang::Ar),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ar => "ar",
        }
    }

    pub fn dir(self) -> &'static str {
        match self {
            Lang::En => "ltr",
            Lang::Ar => "rtl",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Lang::En => Lang::Ar,
            Lang::Ar => Lang::En,
        }
    }

    pub fn text(self) -> &'static SiteText {
        match self {
            Lang::En => &EN,
            Lang::Ar => &AR,
        }
    }
}

#[derive(Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// Pick the page language: an explicit `?lang=` wins and is remembered in a cookie.
pub fn negotiate(jar: CookieJar, requested: Option<&str>) -> (Lang, CookieJar) {
    if let Some(lang) = requested.and_then(Lang::parse) {
        let mut cookie = Cookie::new(LANG_COOKIE, lang.code());
        cookie.set_path("/");
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(CookieDuration::days(LANG_COOKIE_DAYS));
        return (lang, jar.add(cookie));
    }

    let lang = jar
        .get(LANG_COOKIE)
        .and_then(|cookie| Lang::parse(cookie.value()))
        .unwrap_or_default();
    (lang, jar)
}

/// Every piece of public-site copy, once per language.
pub struct SiteText {
    pub brand: &'static str,
    pub tagline: &'static str,
    pub nav_home: &'static str,
    pub nav_services: &'static str,
    pub nav_contact: &'static str,
    pub switch_language: &'static str,
    pub hero_title: &'static str,
    pub hero_body: &'static str,
    pub cta_whatsapp: &'static str,
    pub cta_request: &'static str,
    pub how_title: &'static str,
    pub how_steps: [(&'static str, &'static str); 3],
    pub services_title: &'static str,
    pub services_intro: &'static str,
    pub services_empty: &'static str,
    pub areas_title: &'static str,
    pub areas_empty: &'static str,
    pub contact_title: &'static str,
    pub contact_intro: &'static str,
    pub field_name: &'static str,
    pub field_phone: &'static str,
    pub field_service: &'static str,
    pub field_area: &'static str,
    pub field_details: &'static str,
    pub choose_option: &'static str,
    pub any_area: &'static str,
    pub submit_whatsapp: &'static str,
    pub error_missing_fields: &'static str,
    pub contact_direct: &'static str,
    pub privacy_title: &'static str,
    pub privacy_body: [&'static str; 3],
    pub terms_title: &'static str,
    pub terms_body: [&'static str; 3],
    pub footer_rights: &'static str,
    pub footer_privacy: &'static str,
    pub footer_terms: &'static str,
    pub whatsapp_greeting: &'static str,
    pub lead_name: &'static str,
    pub lead_service: &'static str,
    pub lead_area: &'static str,
    pub lead_phone: &'static str,
    pub lead_details: &'static str,
}

pub static EN: SiteText = SiteText {
    brand: "Sahli",
    tagline: "Trusted home services, coordinated for you.",
    nav_home: "Home",
    nav_services: "Services",
    nav_contact: "Contact",
    switch_language: "العربية",
    hero_title: "Home services without the hassle",
    hero_body: "Tell us what you need and where. Our coordinators match you with a vetted provider and keep you updated on WhatsApp.",
    cta_whatsapp: "Chat on WhatsApp",
    cta_request: "Request a service",
    how_title: "How it works",
    how_steps: [
        ("Tell us", "Share the service you need and your area."),
        ("We match", "A coordinator confirms a vetted provider and a time."),
        ("Job done", "The provider visits and we follow up to make sure all is well."),
    ],
    services_title: "Our services",
    services_intro: "Every request is handled by a coordinator who checks the provider's availability and quality.",
    services_empty: "Our service list is being updated. Message us on WhatsApp for anything you need.",
    areas_title: "Areas we cover",
    areas_empty: "Coverage details coming soon.",
    contact_title: "Request a service",
    contact_intro: "Fill in the form and we will open WhatsApp with your request ready to send.",
    field_name: "Your name",
    field_phone: "Phone (optional)",
    field_service: "Service",
    field_area: "Area",
    field_details: "Details (optional)",
    choose_option: "Choose a service",
    any_area: "Not sure / other",
    submit_whatsapp: "Continue on WhatsApp",
    error_missing_fields: "Please enter your name and choose a service.",
    contact_direct: "Prefer to message directly?",
    privacy_title: "Privacy policy",
    privacy_body: [
        "We only collect the details you choose to send us on WhatsApp to coordinate your request.",
        "Your contact details are shared with the assigned provider only for the job you requested.",
        "To have your information removed, message us and a coordinator will take care of it.",
    ],
    terms_title: "Terms of service",
    terms_body: [
        "Sahli coordinates requests between customers and independent service providers.",
        "Prices and schedules are confirmed with you before any visit takes place.",
        "Providers are responsible for the work they carry out; we help resolve any issue you report.",
    ],
    footer_rights: "All rights reserved.",
    footer_privacy: "Privacy",
    footer_terms: "Terms",
    whatsapp_greeting: "Hello Sahli, I would like to request a service.",
    lead_name: "Name",
    lead_service: "Service",
    lead_area: "Area",
    lead_phone: "Phone",
    lead_details: "Details",
};

pub static AR: SiteText = SiteText {
    brand: "سهلي",
    tagline: "خدمات منزلية موثوقة، ننسقها لك.",
    nav_home: "الرئيسية",
    nav_services: "الخدمات",
    nav_contact: "تواصل معنا",
    switch_language: "English",
    hero_title: "خدمات منزلية بلا عناء",
    hero_body: "أخبرنا بما تحتاجه وأين. يقوم منسقونا بترشيح مزود خدمة موثوق ومتابعتك عبر واتساب.",
    cta_whatsapp: "تحدث معنا على واتساب",
    cta_request: "اطلب خدمة",
    how_title: "كيف نعمل",
    how_steps: [
        ("أخبرنا", "حدد الخدمة التي تحتاجها ومنطقتك."),
        ("نرشح لك", "يؤكد المنسق مزود خدمة موثوقاً وموعداً مناسباً."),
        ("تم الإنجاز", "يزورك المزود ونتابع معك للتأكد من رضاك."),
    ],
    services_title: "خدماتنا",
    services_intro: "يتولى منسق كل طلب ويتحقق من جاهزية مزود الخدمة وجودة عمله.",
    services_empty: "قائمة الخدمات قيد التحديث. راسلنا على واتساب لأي خدمة تحتاجها.",
    areas_title: "المناطق التي نخدمها",
    areas_empty: "سيتم نشر تفاصيل التغطية قريباً.",
    contact_title: "اطلب خدمة",
    contact_intro: "املأ النموذج وسنفتح لك واتساب مع طلبك جاهزاً للإرسال.",
    field_name: "الاسم",
    field_phone: "رقم الهاتف (اختياري)",
    field_service: "الخدمة",
    field_area: "المنطقة",
    field_details: "تفاصيل إضافية (اختياري)",
    choose_option: "اختر خدمة",
    any_area: "غير متأكد / أخرى",
    submit_whatsapp: "المتابعة على واتساب",
    error_missing_fields: "يرجى إدخال الاسم واختيار الخدمة.",
    contact_direct: "تفضل المراسلة مباشرة؟",
    privacy_title: "سياسة الخصوصية",
    privacy_body: [
        "نجمع فقط البيانات التي ترسلها لنا عبر واتساب لتنسيق طلبك.",
        "تتم مشاركة بيانات التواصل مع مزود الخدمة المكلف فقط لأجل الطلب المحدد.",
        "لحذف بياناتك، راسلنا وسيتولى أحد المنسقين ذلك.",
    ],
    terms_title: "شروط الخدمة",
    terms_body: [
        "تقوم سهلي بتنسيق الطلبات بين العملاء ومزودي خدمات مستقلين.",
        "يتم تأكيد الأسعار والمواعيد معك قبل أي زيارة.",
        "يتحمل مزودو الخدمة مسؤولية أعمالهم، ونساعدك في حل أي مشكلة تبلغنا بها.",
    ],
    footer_rights: "جميع الحقوق محفوظة.",
    footer_privacy: "الخصوصية",
    footer_terms: "الشروط",
    whatsapp_greeting: "مرحباً سهلي، أود طلب خدمة.",
    lead_name: "الاسم",
    lead_service: "الخدمة",
    lead_area: "المنطقة",
    lead_phone: "الهاتف",
    lead_details: "التفاصيل",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_language_is_remembered() {
        let (lang, jar) = negotiate(CookieJar::new(), Some("AR"));
        assert_eq!(lang, Lang::Ar);
        assert_eq!(jar.get(LANG_COOKIE).map(|c| c.value()), Some("ar"));

        let (lang, _) = negotiate(jar, None);
        assert_eq!(lang, Lang::Ar);
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let (lang, jar) = negotiate(CookieJar::new(), Some("fr"));
        assert_eq!(lang, Lang::En);
        assert!(jar.get(LANG_COOKIE).is_none());
    }

    #[test]
    fn arabic_renders_right_to_left() {
        assert_eq!(Lang::Ar.dir(), "rtl");
        assert_eq!(Lang::En.other(), Lang::Ar);
        assert_eq!(Lang::Ar.text().brand, "سهلي");
    }
}
