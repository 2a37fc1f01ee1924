//! Kleiner, namespace-aufgelöster Elementbaum auf Basis von quick-xml.
//!
//! WFS-Antworten und Transaction-Requests sind klein; ein Baum ist hier
//! einfacher auszuwerten als ein Event-Strom mit Zustandsflags.

use anyhow::{Context, Result, bail};
use quick_xml::NsReader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, PrefixDeclaration, ResolveResult};

/// Ein XML-Element mit aufgelöstem Namespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Namespace-URI (None = ungebunden)
    pub namespace: Option<String>,
    /// Lokaler Name ohne Präfix
    pub name: String,
    /// Attribute (lokaler Name -> Wert), ohne xmlns-Deklarationen
    pub attributes: Vec<(String, String)>,
    /// Auf diesem Element deklarierte Präfixe (Präfix -> URI, "" = Default)
    pub declarations: Vec<(String, String)>,
    /// Kind-Elemente in Dokumentreihenfolge
    pub children: Vec<Element>,
    text: String,
}

impl Element {
    /// Prüft lokalen Namen und Namespace.
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// Liefert einen Attributwert per lokalem Namen.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Eigener Textinhalt ohne führende/abschließende Leerzeichen.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Erstes direktes Kind mit dem lokalen Namen.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Alle direkten Kinder mit dem lokalen Namen.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Erstes Nachfahren-Element (Tiefensuche, ohne `self`), das `predicate` erfüllt.
    pub fn find<P>(&self, predicate: P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool + Copy,
    {
        for child in &self.children {
            if predicate(child) {
                return Some(child);
            }
            if let Some(found) = child.find(predicate) {
                return Some(found);
            }
        }
        None
    }

    /// Alle Nachfahren in Dokumentreihenfolge, die `predicate` erfüllen.
    pub fn find_all<'a, P>(&'a self, predicate: P, out: &mut Vec<&'a Element>)
    where
        P: Fn(&Element) -> bool + Copy,
    {
        for child in &self.children {
            if predicate(child) {
                out.push(child);
            }
            child.find_all(predicate, out);
        }
    }

    /// Erstes Kind-Element überhaupt (z.B. die Geometrie in einem Property-Element).
    pub fn first_child(&self) -> Option<&Element> {
        self.children.first()
    }
}

/// Maximale Verschachtelungstiefe eines Dokuments.
pub const MAX_DEPTH: usize = 256;

/// Parst ein XML-Dokument in einen Elementbaum und liefert das Wurzelelement.
///
/// Dokumente tiefer als [`MAX_DEPTH`] werden abgelehnt.
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = NsReader::from_str(xml);
    // Kein trim_text: Entity-Referenzen kommen als eigene Events, Trimmen
    // würde Leerzeichen um `&amp;` herum verschlucken.
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = match reader.read_resolved_event() {
            Ok(pair) => pair,
            Err(err) => return Err(err).context("Fehler beim Parsen des XML"),
        };
        let namespace = match resolved {
            ResolveResult::Bound(Namespace(uri)) => Some(
                std::str::from_utf8(uri)
                    .context("Namespace ist kein UTF-8")?
                    .to_string(),
            ),
            _ => None,
        };

        match event {
            Event::Start(ref e) => {
                if stack.len() >= MAX_DEPTH {
                    bail!("Dokument ist tiefer als {} Ebenen verschachtelt", MAX_DEPTH);
                }
                stack.push(open_element(namespace, e)?);
            }
            Event::Empty(ref e) => {
                let element = open_element(namespace, e)?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().context("End-Tag ohne Start-Tag")?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&e.xml_content()?);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(current) = stack.last_mut() {
                    if let Some(ch) = e.resolve_char_ref()? {
                        current.text.push(ch);
                    } else {
                        let entity = e.decode()?;
                        match resolve_predefined_entity(&entity) {
                            Some(value) => current.text.push_str(value),
                            None => bail!("Unbekannte Entity-Referenz: &{};", entity),
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        bail!("Dokument endet mit {} offenen Elementen", stack.len());
    }
    root.context("Dokument enthält kein Wurzelelement")
}

fn open_element(namespace: Option<String>, start: &BytesStart<'_>) -> Result<Element> {
    let name = std::str::from_utf8(start.local_name().as_ref())
        .context("Elementname ist kein UTF-8")?
        .to_string();

    let mut attributes = Vec::new();
    let mut declarations = Vec::new();
    for attr in start.attributes().with_checks(false) {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_namespace_binding() {
            Some(PrefixDeclaration::Default) => declarations.push((String::new(), value)),
            Some(PrefixDeclaration::Named(prefix)) => declarations.push((
                String::from_utf8_lossy(prefix).into_owned(),
                value,
            )),
            None => {
                let key = std::str::from_utf8(attr.key.local_name().as_ref())
                    .context("Attributname ist kein UTF-8")?
                    .to_string();
                attributes.push((key, value));
            }
        }
    }

    Ok(Element {
        namespace,
        name,
        attributes,
        declarations,
        children: Vec::new(),
        text: String::new(),
    })
}

fn close_element(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_some() {
                bail!("Mehr als ein Wurzelelement");
            }
            *root = Some(element);
        }
    }
    Ok(())
}
