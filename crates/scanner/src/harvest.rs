//! The injected harvest script and its payload types.

use {
    serde::Deserialize,
    serde_json::Value,
    skein_common::ActionBounds,
    tracing::debug,
};

use crate::ScanError;

/// Walks the document for actionable elements and returns raw facts about
/// each one. Stamps `data-skein-ref` on every reported element so the page
/// side can resolve a candidate back to its live node. Takes the palette's
/// own root selector (or null) so the palette never reports itself.
const HARVEST_JS: &str = r#"(exclude) => {
    const SELECTOR = [
        'button',
        'a[href]',
        'input[type="submit"]',
        'input[type="button"]',
        '[role="button"]',
        '[role="link"]',
        '[onclick]',
        'select',
    ].join(', ');
    const SECTION_TAGS = ['nav', 'header', 'footer', 'aside', 'main', 'section', 'form'];

    const excludeRoot = exclude ? document.querySelector(exclude) : null;
    const seen = new Set();
    const candidates = [];
    let nextRef = 0;

    const firstLine = (text) => {
        if (!text) return null;
        const line = text.trim().split('\n')[0].trim();
        return line || null;
    };

    const labelledByText = (el) => {
        const ids = el.getAttribute('aria-labelledby');
        if (!ids) return null;
        const parts = ids
            .split(/\s+/)
            .map((id) => {
                const ref = document.getElementById(id);
                return ref && ref.innerText ? ref.innerText.trim() : '';
            })
            .filter(Boolean);
        return parts.length ? parts.join(' ') : null;
    };

    const ancestorContext = (el) => {
        let node = el.parentElement;
        while (node && node !== document.body) {
            const aria = node.getAttribute('aria-label');
            if (aria && aria.trim()) return { kind: 'ariaLabel', value: aria.trim() };
            if (node.id && node.id.length > 2) return { kind: 'id', value: node.id };
            const tag = node.tagName.toLowerCase();
            if (SECTION_TAGS.includes(tag)) {
                const heading = node.querySelector('h1, h2, h3');
                const text = heading ? firstLine(heading.innerText) : null;
                if (text) return { kind: 'heading', value: text };
                return { kind: 'section', value: tag };
            }
            node = node.parentElement;
        }
        return null;
    };

    const pathSegments = (el) => {
        const path = [];
        let cur = el;
        while (cur && cur !== document.body && cur.nodeType === 1) {
            const seg = { tag: cur.tagName.toLowerCase() };
            if (cur.id) {
                seg.id = cur.id;
                path.unshift(seg);
                return path;
            }
            const parent = cur.parentElement;
            if (parent) {
                const sameTag = Array.from(parent.children)
                    .filter((c) => c.tagName === cur.tagName);
                if (sameTag.length > 1) seg.nth = sameTag.indexOf(cur) + 1;
            }
            path.unshift(seg);
            cur = parent;
        }
        return path;
    };

    for (const el of document.querySelectorAll(SELECTOR)) {
        if (seen.has(el)) continue;
        seen.add(el);
        if (excludeRoot && excludeRoot.contains(el)) continue;
        if (el.disabled) continue;
        const style = window.getComputedStyle(el);
        if (style.display === 'none' || style.visibility === 'hidden') continue;
        if (style.opacity === '0') continue;
        const rect = el.getBoundingClientRect();
        if (rect.width === 0 || rect.height === 0) continue;

        const ref = nextRef++;
        el.setAttribute('data-skein-ref', String(ref));
        const img = el.querySelector('img[alt]');

        candidates.push({
            ref,
            tag: el.tagName.toLowerCase(),
            role: el.getAttribute('role'),
            ariaLabel: el.getAttribute('aria-label'),
            labelledBy: labelledByText(el),
            text: firstLine(el.innerText),
            title: el.getAttribute('title'),
            imgAlt: img ? img.getAttribute('alt') : null,
            placeholder: el.getAttribute('placeholder'),
            value: el.tagName === 'INPUT' ? el.value : null,
            href: el.tagName === 'A' ? el.href : null,
            ownId: el.id || null,
            path: pathSegments(el),
            context: ancestorContext(el),
            bounds: {
                x: rect.x + window.scrollX,
                y: rect.y + window.scrollY,
                width: rect.width,
                height: rect.height,
            },
        });
    }

    return { url: window.location.href, title: document.title, candidates };
}"#;

/// Build the harvest expression, binding the exclude selector as a JSON
/// literal.
#[must_use]
pub fn harvest_script(exclude: Option<&str>) -> String {
    let exclude = exclude.map_or_else(|| "null".to_string(), |s| Value::from(s).to_string());
    format!("({HARVEST_JS})({exclude})")
}

/// One step in an element's ancestor path, root-first. A segment carrying an
/// `id` anchors the path; `nth` is set only when siblings share the tag.
#[derive(Debug, Clone, Deserialize)]
pub struct PathSegment {
    pub tag: String,
    #[serde(default)]
    pub nth: Option<u32>,
    #[serde(default)]
    pub id: Option<String>,
}

/// The first ancestor fact usable as disambiguation context.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ContextSource {
    AriaLabel(String),
    Id(String),
    Heading(String),
    Section(String),
}

/// Raw facts about one actionable element, exactly as the harvest script
/// reported them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidate {
    #[serde(rename = "ref")]
    pub page_ref: u32,
    pub tag: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub aria_label: Option<String>,
    #[serde(default)]
    pub labelled_by: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub img_alt: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub own_id: Option<String>,
    #[serde(default)]
    pub path: Vec<PathSegment>,
    #[serde(default)]
    pub context: Option<ContextSource>,
    #[serde(default)]
    pub bounds: Option<ActionBounds>,
}

/// Parsed harvest payload.
#[derive(Debug, Clone)]
pub struct Harvest {
    pub url: String,
    pub title: String,
    pub candidates: Vec<RawCandidate>,
}

/// Parse the harvest script's return value. Individually malformed candidates
/// are skipped; a malformed top level is an error.
pub fn parse_harvest(value: Value) -> Result<Harvest, ScanError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ScanError::MalformedHarvest("not an object".into()))?;
    let url = obj
        .get("url")
        .and_then(Value::as_str)
        .ok_or_else(|| ScanError::MalformedHarvest("missing url".into()))?
        .to_string();
    let title = obj
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let raw = obj
        .get("candidates")
        .and_then(Value::as_array)
        .ok_or_else(|| ScanError::MalformedHarvest("missing candidates".into()))?;

    let candidates = raw
        .iter()
        .filter_map(|entry| match serde_json::from_value(entry.clone()) {
            Ok(candidate) => Some(candidate),
            Err(error) => {
                debug!(%error, "skipping malformed candidate");
                None
            },
        })
        .collect();

    Ok(Harvest { url, title, candidates })
}
