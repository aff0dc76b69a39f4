//! Tags are the category / value pairs that, together with a name, identify a
//! metric. The collector wants them embedded in the metric name itself as a
//! "stream tag" suffix, each component base64 encoded, so this module knows
//! how to render a tag collection three ways: plain, encoded and streamed.
//!
//! Order of insertion never matters. Every rendering sorts the tags by their
//! plain `category:value` form first.

use std::fmt;
use std::iter::FromIterator;
use std::slice::Iter;

/// Marker of a component that has already been base64 encoded and wrapped.
const ENCODED_SIG: &str = "b\"";

/// Normalize a tag category: spaces become underscores, everything is
/// lowercased.
pub fn normalize(category: &str) -> String {
    category.replace(' ', "_").to_lowercase()
}

#[inline]
fn encode_component(component: &str, s: &mut String) {
    if component.is_empty() {
        return;
    }
    if component.starts_with(ENCODED_SIG) {
        s.push_str(component);
    } else {
        s.push_str(ENCODED_SIG);
        s.push_str(&base64::encode(component));
        s.push('"');
    }
}

/// A single category / value pair.
///
/// A tag with an empty category is considered absent and renders to nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// The tag category, normalized when rendered
    pub category: String,
    /// The tag value, rendered verbatim
    pub value: String,
}

impl Tag {
    /// Create a new tag
    pub fn new<C, V>(category: C, value: V) -> Tag
    where
        C: Into<String>,
        V: Into<String>,
    {
        Tag {
            category: category.into(),
            value: value.into(),
        }
    }

    /// Render the tag in its stream tag encoding, `b"<cat>":b"<val>"`.
    ///
    /// Components that already start with `b"` are assumed to be encoded and
    /// pass through untouched. Empty components stay empty.
    pub fn encode(&self) -> String {
        let mut s = String::new();
        self.encode_into(&mut s);
        s
    }

    fn encode_into(&self, s: &mut String) {
        if self.category.is_empty() {
            return;
        }
        if self.category.starts_with(ENCODED_SIG) {
            s.push_str(&self.category);
        } else {
            encode_component(&normalize(&self.category), s);
        }
        s.push(':');
        encode_component(&self.value, s);
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.category.is_empty() {
            return Ok(());
        }
        write!(f, "{}:{}", normalize(&self.category), self.value)
    }
}

/// An unordered collection of `Tag`s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    inner: Vec<Tag>,
}

impl Tags {
    /// Create an empty tag collection
    pub fn new() -> Tags {
        Tags::default()
    }

    /// Add a tag to the collection. Duplicates are kept, as given.
    pub fn push(&mut self, tag: Tag) {
        self.inner.push(tag);
    }

    /// Builder style `push`
    pub fn with<C, V>(mut self, category: C, value: V) -> Tags
    where
        C: Into<String>,
        V: Into<String>,
    {
        self.push(Tag::new(category, value));
        self
    }

    /// Number of tags, empty categories included.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Determine if there are no tags at all
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate the tags in insertion order
    pub fn iter(&self) -> Iter<Tag> {
        self.inner.iter()
    }

    /// Concatenate self with `global`, global tags last.
    pub fn with_global(&self, global: &Tags) -> Tags {
        let mut inner = Vec::with_capacity(self.inner.len() + global.inner.len());
        inner.extend_from_slice(&self.inner);
        inner.extend_from_slice(&global.inner);
        Tags { inner }
    }

    /// Tags in canonical order, absent tags removed, paired with their plain
    /// rendering.
    fn canonical(&self) -> Vec<(String, &Tag)> {
        let mut plain: Vec<(String, &Tag)> = self
            .inner
            .iter()
            .filter(|t| !t.category.is_empty())
            .map(|t| (t.to_string(), t))
            .collect();
        // "a:b"+"c" and "a"+"b:c" share a plain form, so ties fall back to
        // the encoding to keep the order independent of insertion.
        plain.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.encode().cmp(&b.1.encode())));
        plain
    }

    /// Render every tag in stream tag encoding, sorted, comma separated.
    pub fn encode(&self) -> String {
        let mut s = String::with_capacity(self.inner.len() * 24);
        for (i, &(_, tag)) in self.canonical().iter().enumerate() {
            if i > 0 {
                s.push(',');
            }
            tag.encode_into(&mut s);
        }
        s
    }

    /// Render the stream tag suffix appended to a metric name,
    /// `|ST[<encoded>]`, or nothing at all if there are no tags to render.
    pub fn stream(&self) -> String {
        let encoded = self.encode();
        if encoded.is_empty() {
            return encoded;
        }
        let mut s = String::with_capacity(encoded.len() + 5);
        s.push_str("|ST[");
        s.push_str(&encoded);
        s.push(']');
        s
    }
}

impl fmt::Display for Tags {
    /// Sorted, comma separated plain rendering. This is the form metric
    /// identity is computed over.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, &(ref plain, _)) in self.canonical().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(plain)?;
        }
        Ok(())
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Tags {
        Tags {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<C, V> FromIterator<(C, V)> for Tags
where
    C: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Tags {
        iter.into_iter().map(|(c, v)| Tag::new(c, v)).collect()
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
