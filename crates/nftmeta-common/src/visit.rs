//! Typed traversal of static resources
//!
//! Each node type hands out mutable references to the static resources it
//! owns, tagged with a dotted path for diagnostics. Dynamic resources are a
//! separate type and are never yielded.

use crate::types::{Factory, Media, Metadata, NftCollection, StaticResource, Token};

/// A static resource slot inside the tree
#[derive(Debug)]
pub struct ResourceSlot<'a> {
    /// Dotted location, e.g. `tokens[2].media.gallery[0]`
    pub path: String,
    pub resource: &'a mut StaticResource,
}

/// Implemented by every node that owns static resources
pub trait StaticResources {
    /// Push this node's slots onto `out`, prefixing paths with `prefix`
    fn collect_static<'a>(&'a mut self, prefix: &str, out: &mut Vec<ResourceSlot<'a>>);

    /// All static resource slots below this node, in document order
    fn static_resources_mut(&mut self) -> Vec<ResourceSlot<'_>> {
        let mut out = Vec::new();
        self.collect_static("", &mut out);
        out
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

impl StaticResources for Media {
    fn collect_static<'a>(&'a mut self, prefix: &str, out: &mut Vec<ResourceSlot<'a>>) {
        out.push(ResourceSlot {
            path: join(prefix, "product"),
            resource: &mut self.product,
        });
        out.push(ResourceSlot {
            path: join(prefix, "square"),
            resource: &mut self.square,
        });
        if let Some(hero) = self.hero.as_mut() {
            out.push(ResourceSlot {
                path: join(prefix, "hero"),
                resource: hero,
            });
        }
        if let Some(gallery) = self.gallery.as_mut() {
            for (i, resource) in gallery.iter_mut().enumerate() {
                out.push(ResourceSlot {
                    path: format!("{}[{}]", join(prefix, "gallery"), i),
                    resource,
                });
            }
        }
    }
}

impl StaticResources for Metadata {
    fn collect_static<'a>(&'a mut self, prefix: &str, out: &mut Vec<ResourceSlot<'a>>) {
        self.media.collect_static(&join(prefix, "media"), out);
        if let Some(resources) = self.resources.as_mut() {
            let base = join(prefix, "resources");
            for (name, resource) in resources.iter_mut() {
                out.push(ResourceSlot {
                    path: join(&base, name),
                    resource,
                });
            }
        }
    }
}

impl StaticResources for Factory {
    fn collect_static<'a>(&'a mut self, prefix: &str, out: &mut Vec<ResourceSlot<'a>>) {
        self.metadata.collect_static(prefix, out);
    }
}

impl StaticResources for Token {
    fn collect_static<'a>(&'a mut self, prefix: &str, out: &mut Vec<ResourceSlot<'a>>) {
        self.metadata.collect_static(prefix, out);
    }
}

impl StaticResources for NftCollection {
    fn collect_static<'a>(&'a mut self, prefix: &str, out: &mut Vec<ResourceSlot<'a>>) {
        self.factory.collect_static(&join(prefix, "factory"), out);
        if let Some(default_token) = self.default_token.as_mut() {
            default_token.collect_static(&join(prefix, "defaultToken"), out);
        }
        let base = join(prefix, "tokens");
        for (i, token) in self.tokens.iter_mut().enumerate() {
            token.collect_static(&format!("{}[{}]", base, i), out);
        }
    }
}
