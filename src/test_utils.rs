//! Builders for small in-memory dictionary and DAWG images used by tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::encoding::{Latin1, WordEncoding};
use crate::format::{
    COMPLETE_MEANING_MASK, ENTRY_COMMON_KSNID, ENTRY_KIND_COMPLETE, ENTRY_KIND_CONTINUATION,
    ENTRY_KIND_HEAD, ENTRY_KIND_TAIL, ENTRY_LAST, HEADER_SIZE, KSNID_BITS, LEMMA_DOMAIN_MASK,
    LEMMA_HAS_TEMPLATE, LEMMA_ID_BITS, MEANING_SLOT_LEN, NODE_CHAR_SHIFT, NODE_CHILDLESS,
    NODE_NO_VALUE, NODE_SINGLE_CHAR, SIGNATURE,
};

/// Ksnid record shared by most entries (index 1).
pub const COMMON_KSNID: &str = "1;;;;K;1;;;";

/// One mapping-table entry as the builder should pack it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packed {
    Complete { lemma_id: u32, meaning: u32, common: bool },
    Continuation { meaning: u32, ksnid: u32 },
    Pair { lemma_id: u32, meaning: u32, ksnid: u32 },
    /// A word written verbatim (the last-word flag is still managed).
    Raw(u32),
}

impl Packed {
    fn words(self) -> Vec<u32> {
        match self {
            Packed::Complete {
                lemma_id,
                meaning,
                common,
            } => {
                let common = if common { ENTRY_COMMON_KSNID } else { 0 };
                vec![ENTRY_KIND_COMPLETE | common | (meaning << LEMMA_ID_BITS) | lemma_id]
            }
            Packed::Continuation { meaning, ksnid } => {
                vec![ENTRY_KIND_CONTINUATION | (meaning << KSNID_BITS) | ksnid]
            }
            Packed::Pair {
                lemma_id,
                meaning,
                ksnid,
            } => vec![
                ENTRY_KIND_HEAD | lemma_id,
                ENTRY_KIND_TAIL | (meaning << KSNID_BITS) | ksnid,
            ],
            Packed::Raw(word) => vec![word],
        }
    }
}

#[derive(Debug, Clone)]
struct LemmaDraft {
    headword: Vec<u8>,
    domain: u32,
    forms: Option<Vec<Vec<u8>>>,
}

/// Assembles a complete main database image.
#[derive(Debug, Clone)]
pub struct ImageBuilder {
    alphabet: Vec<u8>,
    meanings: Vec<(String, String)>,
    lemmas: Vec<Option<LemmaDraft>>,
    ksnid: Vec<String>,
    forms: BTreeMap<Vec<u8>, Vec<Packed>>,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    pub fn new() -> Self {
        ImageBuilder {
            alphabet: Vec::new(),
            meanings: Vec::new(),
            // Lemma id 0 never has a record
            lemmas: vec![None],
            ksnid: vec![String::new(), COMMON_KSNID.to_string()],
            forms: BTreeMap::new(),
        }
    }

    /// Characters eligible for single-character trie nodes.
    pub fn alphabet(&mut self, chars: &str) -> &mut Self {
        self.alphabet = encode(chars);
        self
    }

    /// Index of a meaning slot, added on first use.
    pub fn meaning(&mut self, class: &str, tag: &str) -> u32 {
        let key = (class.to_string(), tag.to_string());
        if let Some(ix) = self.meanings.iter().position(|m| *m == key) {
            return ix as u32;
        }
        self.meanings.push(key);
        (self.meanings.len() - 1) as u32
    }

    /// Register a lemma without an inflection template.
    pub fn lemma(&mut self, headword: &str, domain: u32) -> u32 {
        self.push_lemma(LemmaDraft {
            headword: encode(headword),
            domain,
            forms: None,
        })
    }

    /// Register a lemma whose template lists `forms`.
    pub fn lemma_with_forms(&mut self, headword: &str, domain: u32, forms: &[&str]) -> u32 {
        let mut forms: Vec<Vec<u8>> = forms.iter().map(|f| encode(f)).collect();
        forms.sort();
        forms.dedup();
        self.push_lemma(LemmaDraft {
            headword: encode(headword),
            domain,
            forms: Some(forms),
        })
    }

    /// Reserve a lemma id that has no record at all.
    pub fn missing_lemma(&mut self) -> u32 {
        self.lemmas.push(None);
        (self.lemmas.len() - 1) as u32
    }

    fn push_lemma(&mut self, draft: LemmaDraft) -> u32 {
        self.lemmas.push(Some(draft));
        (self.lemmas.len() - 1) as u32
    }

    /// Index of a ksnid record, added on first use.
    pub fn ksnid(&mut self, record: &str) -> u32 {
        if let Some(ix) = self.ksnid.iter().skip(1).position(|r| r == record) {
            return ix as u32 + 1;
        }
        self.ksnid.push(record.to_string());
        (self.ksnid.len() - 1) as u32
    }

    /// Append an entry with the common attribute record.
    pub fn entry(&mut self, form: &str, lemma_id: u32, class: &str, tag: &str) -> &mut Self {
        let meaning = self.meaning(class, tag);
        let packed = if meaning <= COMPLETE_MEANING_MASK {
            Packed::Complete {
                lemma_id,
                meaning,
                common: true,
            }
        } else {
            Packed::Pair {
                lemma_id,
                meaning,
                ksnid: 1,
            }
        };
        self.packed(form, packed)
    }

    /// Append an entry with its own attribute record.
    pub fn entry_with_ksnid(
        &mut self,
        form: &str,
        lemma_id: u32,
        class: &str,
        tag: &str,
        record: &str,
    ) -> &mut Self {
        let meaning = self.meaning(class, tag);
        let ksnid = self.ksnid(record);
        self.packed(
            form,
            Packed::Pair {
                lemma_id,
                meaning,
                ksnid,
            },
        )
    }

    /// Append a raw mapping entry.
    pub fn packed(&mut self, form: &str, packed: Packed) -> &mut Self {
        self.forms.entry(encode(form)).or_default().push(packed);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE];
        out[..SIGNATURE.len()].copy_from_slice(SIGNATURE);

        let alphabet = out.len();
        push_u32(&mut out, self.alphabet.len() as u32);
        out.extend_from_slice(&self.alphabet);
        align(&mut out);

        let meanings = out.len();
        let slots = meanings + 4 * self.meanings.len();
        for i in 0..self.meanings.len() {
            push_u32(&mut out, (slots + i * MEANING_SLOT_LEN) as u32);
        }
        for (class, tag) in &self.meanings {
            let mut slot = encode(&format!("{class} {tag}"));
            slot.resize(MEANING_SLOT_LEN, b' ');
            out.extend_from_slice(&slot);
        }

        // Templates go first so lemma records can refer to them
        let templates = out.len();
        let mut template_offsets = vec![None; self.lemmas.len()];
        for (id, lemma) in self.lemmas.iter().enumerate() {
            if let Some(LemmaDraft {
                headword,
                forms: Some(forms),
                ..
            }) = lemma
            {
                template_offsets[id] = Some((out.len() - templates) as u32);
                out.extend_from_slice(&encode_template(headword, forms));
            }
        }
        align(&mut out);

        let lemmas = out.len();
        let table = reserve(&mut out, self.lemmas.len());
        for (id, lemma) in self.lemmas.iter().enumerate() {
            let Some(lemma) = lemma else { continue };
            let record = out.len() as u32;
            set_u32(&mut out, table + 4 * id, record);
            let mut bits = lemma.domain & LEMMA_DOMAIN_MASK;
            if template_offsets[id].is_some() {
                bits |= LEMMA_HAS_TEMPLATE;
            }
            push_u32(&mut out, bits);
            out.push(lemma.headword.len() as u8);
            out.extend_from_slice(&lemma.headword);
            align(&mut out);
            if let Some(offset) = template_offsets[id] {
                push_u32(&mut out, offset);
            }
        }

        let ksnid = out.len();
        let table = reserve(&mut out, self.ksnid.len());
        for (ix, record) in self.ksnid.iter().enumerate() {
            let at = out.len() as u32;
            set_u32(&mut out, table + 4 * ix, at);
            let bytes = encode(record);
            out.push(bytes.len() as u8);
            out.extend_from_slice(&bytes);
        }
        align(&mut out);

        let subcats = out.len();
        push_u32(&mut out, 0);

        let mappings = out.len();
        let mut values = Vec::with_capacity(self.forms.len());
        for (form, entries) in &self.forms {
            let value = ((out.len() - mappings) / 4) as u32;
            let mut words: Vec<u32> = entries.iter().flat_map(|p| p.words()).collect();
            if let Some(last) = words.last_mut() {
                *last |= ENTRY_LAST;
            }
            for word in words {
                push_u32(&mut out, word);
            }
            values.push((form.clone(), value));
        }

        let forms = out.len();
        let root = TrieNode::build(Vec::new(), &values);
        root.write(&mut out, &self.alphabet, true);

        for (i, offset) in [
            mappings, forms, lemmas, templates, meanings, alphabet, subcats, ksnid,
        ]
        .into_iter()
        .enumerate()
        {
            set_u32(&mut out, SIGNATURE.len() + 4 * i, offset as u32);
        }
        out
    }
}

#[derive(Debug)]
struct TrieNode {
    fragment: Vec<u8>,
    value: Option<u32>,
    children: Vec<TrieNode>,
}

impl TrieNode {
    /// Build a radix node from `(remaining suffix, value)` pairs sorted by suffix.
    fn build(fragment: Vec<u8>, entries: &[(Vec<u8>, u32)]) -> TrieNode {
        let value = entries.iter().find(|(s, _)| s.is_empty()).map(|(_, v)| *v);
        let mut groups: BTreeMap<u8, Vec<(Vec<u8>, u32)>> = BTreeMap::new();
        for (suffix, value) in entries.iter().filter(|(s, _)| !s.is_empty()) {
            groups
                .entry(suffix[0])
                .or_default()
                .push((suffix.clone(), *value));
        }
        let children = groups
            .into_values()
            .map(|group| {
                let lcp = group
                    .iter()
                    .map(|(s, _)| s.as_slice())
                    .reduce(|a, b| &a[..common_prefix(a, b)])
                    .unwrap_or_default()
                    .to_vec();
                let rest: Vec<(Vec<u8>, u32)> = group
                    .into_iter()
                    .map(|(s, v)| (s[lcp.len()..].to_vec(), v))
                    .collect();
                TrieNode::build(lcp, &rest)
            })
            .collect();
        TrieNode {
            fragment,
            value,
            children,
        }
    }

    fn single_char_index(&self, alphabet: &[u8]) -> Option<u32> {
        match self.fragment.as_slice() {
            [ch] => alphabet
                .iter()
                .position(|a| a == ch)
                .map(|i| i as u32 + 1)
                .filter(|&i| i <= 0x7F),
            _ => None,
        }
    }

    /// Write this node and its subtree at the end of `out`; returns the node offset.
    fn write(&self, out: &mut Vec<u8>, alphabet: &[u8], is_root: bool) -> usize {
        let at = out.len();
        let mut header = self.value.unwrap_or(NODE_NO_VALUE);
        let single = if is_root {
            None
        } else {
            self.single_char_index(alphabet)
        };
        if let Some(index) = single {
            header |= NODE_SINGLE_CHAR | (index << NODE_CHAR_SHIFT);
        }
        if self.children.is_empty() {
            header |= NODE_CHILDLESS;
        }
        push_u32(out, header);

        let mut slots = 0;
        if !self.children.is_empty() {
            push_u32(out, self.children.len() as u32);
            slots = reserve(out, self.children.len());
        }
        if single.is_none() {
            out.extend_from_slice(&self.fragment);
            out.push(0);
        }
        align(out);

        for (i, child) in self.children.iter().enumerate() {
            let offset = child.write(out, alphabet, false);
            set_u32(out, slots + 4 * i, offset as u32);
        }
        at
    }
}

/// Front-code an inflected-form set relative to its headword.
fn encode_template(headword: &[u8], forms: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut last: &[u8] = headword;
    for form in forms {
        let common = common_prefix(last, form);
        let cut = last.len() - common;
        let suffix = &form[common..];
        let diff = suffix.len() as i64 - cut as i64;
        let short = ((cut as u8) << 3) | ((diff as u8) & 7);
        if cut <= 15 && (-4..=3).contains(&diff) && short != 0 {
            out.push(short);
        } else {
            out.push(0x80 | cut as u8);
            out.push(suffix.len() as u8);
        }
        out.extend_from_slice(suffix);
        last = form;
    }
    out.push(0);
    out
}

/// Build a DAWG image accepting exactly `words`.
pub fn dawg_image(words: &[&str]) -> Vec<u8> {
    #[derive(Default)]
    struct Node {
        end: bool,
        children: BTreeMap<u8, Node>,
    }

    let mut root = Node::default();
    for word in words {
        let mut node = &mut root;
        for byte in encode(word) {
            node = node.children.entry(byte).or_default();
        }
        node.end = true;
    }

    // Sibling lists are laid out breadth first; index 0..4 is the header
    let mut nodes: Vec<u32> = Vec::new();
    let mut queue: Vec<(&Node, Option<usize>)> = vec![(&root, None)];
    let mut head = 0;
    while head < queue.len() {
        let (node, parent) = queue[head];
        head += 1;
        if node.children.is_empty() {
            continue;
        }
        let start = nodes.len() + 4;
        if let Some(parent) = parent {
            nodes[parent] |= (start as u32) << 8;
        }
        let count = node.children.len();
        for (i, (&letter, child)) in node.children.iter().enumerate() {
            let mut word = u32::from(letter);
            if child.end {
                word |= 0x8000_0000;
            }
            if i + 1 == count {
                word |= 0x4000_0000;
            }
            nodes.push(word);
            queue.push((child, Some(nodes.len() - 1)));
        }
    }

    let mut out = Vec::new();
    push_u32(&mut out, 0x4441_5747);
    push_u32(&mut out, 1);
    push_u32(&mut out, nodes.len() as u32);
    push_u32(&mut out, 16);
    for node in nodes {
        push_u32(&mut out, node);
    }
    out
}

pub fn encode(text: &str) -> Vec<u8> {
    Latin1
        .encode(text)
        .unwrap_or_else(|| panic!("{text:?} is not Latin-1"))
}

/// Sorted, deduplicated set of strings, for comparing lookup results.
pub fn set<'a, I: IntoIterator<Item = &'a str>>(items: I) -> BTreeSet<String> {
    items.into_iter().map(str::to_string).collect()
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn set_u32(out: &mut [u8], at: usize, value: u32) {
    out[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn reserve(out: &mut Vec<u8>, words: usize) -> usize {
    let at = out.len();
    out.resize(at + 4 * words, 0);
    at
}

fn align(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}
