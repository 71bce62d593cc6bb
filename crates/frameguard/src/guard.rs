//! Mutation guard
//!
//! Interception points for the markup sinks a realm boundary can be crossed
//! through. Each entry point stringifies its content once, decides on that
//! string, and only then lets the same string reach the target document.
//! Decisions parse into a scratch realm; the guest realms are not touched
//! until the verdict is `Allow`.

use frameguard_dom::{Document, NodeId, NodeKind};
use frameguard_html::HtmlParser;
use frameguard_realm::{Interface, Realm, RealmId, RealmTable, TypeError, Value};

use crate::classify::Classifier;
use crate::config::GuardConfig;
use crate::discovery::{discover, discover_in_shadows};
use crate::error::{GuardError, MutationError};
use crate::messages::ErrorKind;
use crate::vault::{Vault, VaultOp};

/// Markup sinks under interception
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    DocumentWrite,
    DocumentWriteLn,
    InnerHtml,
    IframeSrcdoc,
}

/// Outcome of a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(ErrorKind),
}

impl Verdict {
    #[inline]
    pub fn is_allowed(self) -> bool {
        self == Verdict::Allow
    }

    /// Run `next` only if this verdict allows
    fn and_then(self, next: impl FnOnce() -> Verdict) -> Verdict {
        match self {
            Verdict::Allow => next(),
            deny => deny,
        }
    }
}

/// A requested mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRequest {
    /// Realm whose code issued the call
    pub origin: RealmId,
    /// Realm owning the document being mutated
    pub target: RealmId,
    pub sink: Sink,
    pub content: String,
}

/// The mutation guard
#[derive(Debug)]
pub struct FrameGuard<'v> {
    vault: &'v Vault,
    config: GuardConfig,
    parser: HtmlParser,
}

impl<'v> FrameGuard<'v> {
    pub fn new(vault: &'v Vault, config: GuardConfig) -> Self {
        Self {
            vault,
            config,
            parser: HtmlParser::new(),
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    fn classifier(&self) -> Classifier<'v> {
        Classifier::new(Some(self.vault))
    }

    fn top_realm(&self) -> RealmId {
        RealmId::new(self.config.top_realm)
    }

    // === Decisions ===

    /// Verdict for `request`, computed from the request alone
    pub fn decide(&self, request: &MutationRequest) -> Verdict {
        match request.sink {
            Sink::DocumentWrite | Sink::DocumentWriteLn => self
                .check_write(request.origin, request.target)
                .and_then(|| self.check_markup(&request.content)),
            Sink::InnerHtml => self.check_markup(&request.content),
            Sink::IframeSrcdoc => self.check_srcdoc(&request.content),
        }
    }

    /// Serialization writes are only allowed from and into the top realm
    pub fn check_write(&self, origin: RealmId, target: RealmId) -> Verdict {
        let top = self.top_realm();
        if origin != top || target != top {
            Verdict::Deny(ErrorKind::NonTopDocumentWriteBlocked)
        } else {
            Verdict::Allow
        }
    }

    /// Lazy-document content: no frame anywhere in the document, including
    /// inside declarative shadow roots. Checked as given and again after a
    /// serialize-and-reparse round trip, where mutated markup (mXSS) shows
    /// its frames.
    pub fn check_srcdoc(&self, markup: &str) -> Verdict {
        self.check_lazy_document(markup).and_then(|| match self.parser.reserialize(markup) {
            Ok(reparsed) => self.check_lazy_document(&reparsed),
            Err(err) => {
                tracing::warn!(%err, "srcdoc content could not be reserialized");
                Verdict::Deny(ErrorKind::HtmlFramesSrcdocBlocked)
            }
        })
    }

    fn check_lazy_document(&self, markup: &str) -> Verdict {
        let mut scratch = scratch_realm();
        let doc = match self.parser.parse_detached_document(scratch.tree_mut(), markup) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(%err, "srcdoc content could not be parsed");
                return Verdict::Deny(ErrorKind::HtmlFramesSrcdocBlocked);
            }
        };

        let classifier = self.classifier();
        let frames = discover(&classifier, &mut scratch, &Value::from(doc), true);
        if !frames.is_empty() {
            tracing::debug!(frames = frames.len(), "srcdoc content creates frames");
            return Verdict::Deny(ErrorKind::HtmlFramesSrcdocBlocked);
        }
        self.check_declarative(&classifier, &mut scratch, doc)
    }

    /// Markup inserted through innerHTML or a write: declarative shadow roots
    /// must not carry frames, and any frame it creates must pass the srcdoc
    /// check for its own `srcdoc` attribute. Only light-tree frames are left
    /// once the shadow check allows.
    pub fn check_markup(&self, markup: &str) -> Verdict {
        let mut scratch = scratch_realm();
        let fragment = match self.parser.parse_fragment(scratch.tree_mut(), markup) {
            Ok(fragment) => fragment,
            Err(err) => {
                tracing::warn!(%err, "markup could not be parsed");
                return Verdict::Deny(ErrorKind::DeclarativeShadowsBlocked);
            }
        };

        let classifier = self.classifier();
        self.check_declarative(&classifier, &mut scratch, fragment).and_then(|| {
            let frames = discover(&classifier, &mut scratch, &Value::from(fragment), false);
            for frame in &frames {
                if let Some(srcdoc) = scratch.tree().get_attribute(*frame, "srcdoc") {
                    let verdict = self.check_srcdoc(srcdoc);
                    if !verdict.is_allowed() {
                        return verdict;
                    }
                }
            }
            Verdict::Allow
        })
    }

    fn check_declarative(&self, classifier: &Classifier<'_>, scratch: &mut Realm, root: NodeId) -> Verdict {
        let shadowed = discover_in_shadows(classifier, scratch, root);
        if shadowed.is_empty() {
            Verdict::Allow
        } else {
            tracing::debug!(roots = shadowed.len(), "declarative shadow roots carry frames");
            Verdict::Deny(ErrorKind::DeclarativeShadowsBlocked)
        }
    }

    /// The verdict of every sink for `markup`, as issued by the top realm on
    /// its own document
    pub fn verdicts_for(&self, markup: &str) -> Vec<(Sink, Verdict)> {
        let top = self.top_realm();
        [Sink::DocumentWrite, Sink::DocumentWriteLn, Sink::InnerHtml, Sink::IframeSrcdoc]
            .into_iter()
            .map(|sink| {
                let request = MutationRequest {
                    origin: top,
                    target: top,
                    sink,
                    content: markup.to_string(),
                };
                (sink, self.decide(&request))
            })
            .collect()
    }

    fn enforce(&self, request: &MutationRequest) -> Result<(), GuardError> {
        match self.decide(request) {
            Verdict::Allow => Ok(()),
            Verdict::Deny(kind) => {
                tracing::warn!(
                    code = kind.code(),
                    sink = ?request.sink,
                    origin = request.origin.index(),
                    target = request.target.index(),
                    report_only = self.config.is_report_only(),
                    "mutation blocked"
                );
                if self.config.is_report_only() {
                    Ok(())
                } else {
                    Err(kind.into())
                }
            }
        }
    }

    // === Entry points ===

    /// `document.write(...args)` issued by `origin` on the document of `target`
    pub fn document_write(
        &self,
        realms: &mut RealmTable,
        origin: RealmId,
        target: RealmId,
        args: &[Value],
    ) -> Result<(), MutationError> {
        self.write(realms, origin, target, args, Sink::DocumentWrite)
    }

    /// `document.writeln(...args)`
    pub fn document_writeln(
        &self,
        realms: &mut RealmTable,
        origin: RealmId,
        target: RealmId,
        args: &[Value],
    ) -> Result<(), MutationError> {
        self.write(realms, origin, target, args, Sink::DocumentWriteLn)
    }

    fn write(
        &self,
        realms: &mut RealmTable,
        origin: RealmId,
        target: RealmId,
        args: &[Value],
        sink: Sink,
    ) -> Result<(), MutationError> {
        let mut content = String::new();
        for arg in args {
            content.push_str(&self.stringify(realms, origin, arg)?);
        }
        if sink == Sink::DocumentWriteLn {
            content.push('\n');
        }

        let request = MutationRequest {
            origin,
            target,
            sink,
            content,
        };
        self.enforce(&request)?;

        let realm = realms.get_mut(target).ok_or(MutationError::UnknownRealm(target))?;
        let parent = insertion_point(realm.document());
        let tree = realm.tree_mut();
        let fragment = self.parser.parse_fragment(tree, &request.content)?;
        tree.move_children(fragment, parent)?;
        Ok(())
    }

    /// `node.innerHTML = content`; `node` is an element or shadow root of `target`
    pub fn set_inner_html(
        &self,
        realms: &mut RealmTable,
        origin: RealmId,
        target: RealmId,
        node: NodeId,
        content: &Value,
    ) -> Result<(), MutationError> {
        let markup = self.stringify(realms, origin, content)?;
        let realm = realms.get_mut(target).ok_or(MutationError::UnknownRealm(target))?;
        if !matches!(realm.tree().kind(node), Some(NodeKind::Element | NodeKind::DocumentFragment)) {
            return Err(TypeError("Illegal invocation of innerHTML setter".to_string()).into());
        }

        let request = MutationRequest {
            origin,
            target,
            sink: Sink::InnerHtml,
            content: markup,
        };
        self.enforce(&request)?;

        let tree = realm.tree_mut();
        let fragment = self.parser.parse_fragment(tree, &request.content)?;
        tree.clear_children(node);
        tree.move_children(fragment, node)?;
        Ok(())
    }

    /// `iframe.srcdoc = content`; `iframe` belongs to `target`
    pub fn set_srcdoc(
        &self,
        realms: &mut RealmTable,
        origin: RealmId,
        target: RealmId,
        iframe: NodeId,
        content: &Value,
    ) -> Result<(), MutationError> {
        let markup = self.stringify(realms, origin, content)?;
        let realm = realms.get_mut(target).ok_or(MutationError::UnknownRealm(target))?;
        if Interface::of_node(realm.tree(), iframe) != Some(Interface::HtmlIFrameElement) {
            return Err(TypeError("Illegal invocation of srcdoc setter".to_string()).into());
        }

        let request = MutationRequest {
            origin,
            target,
            sink: Sink::IframeSrcdoc,
            content: markup,
        };
        self.enforce(&request)?;

        realm.tree_mut().set_attribute(iframe, "srcdoc", &request.content)?;
        Ok(())
    }

    /// String form of `value` as the sink receives it. Trusted wrappers are
    /// unwrapped through the vault; anything else converts the way the guest
    /// would, exactly once.
    fn stringify(&self, realms: &mut RealmTable, origin: RealmId, value: &Value) -> Result<String, MutationError> {
        let realm = realms.get_mut(origin).ok_or(MutationError::UnknownRealm(origin))?;
        if self.classifier().is_trusted_wrapper(realm, value) {
            let unwrapped = self.vault.invoke(VaultOp::TrustedHtmlToString, realm, value, &[])?;
            return unwrapped
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| TypeError("trusted wrapper has no contents".to_string()).into());
        }
        Ok(realm.to_display_string(value)?)
    }
}

/// Where written markup lands: the body, else the document element
fn insertion_point(document: &Document) -> NodeId {
    [document.body(), document.document_element()]
        .into_iter()
        .find(|id| id.is_valid())
        .unwrap_or_else(|| document.tree().root())
}

fn scratch_realm() -> Realm {
    Realm::top(Document::empty("about:blank"))
}
