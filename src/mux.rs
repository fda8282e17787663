//! Exact-path route table.
//!
//! One radix tree keyed by path; each leaf holds the handlers registered for
//! that path, one per method. Paths are stored literally: `{` and `}` are
//! escaped before insertion so `matchit` never sees a parameter.

use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::BoxedHandler;

/// Result of looking up a request.
pub(crate) enum Lookup {
    Found(BoxedHandler),
    /// The path exists but not for this method. Carries what is allowed,
    /// in registration order.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

#[derive(Default)]
pub(crate) struct Mux {
    tree: MatchitRouter<Vec<(Method, BoxedHandler)>>,
}

impl Mux {
    /// Adds `handler` under `method` + `path`. Fails on a duplicate pair.
    pub(crate) fn insert(
        &mut self,
        method: Method,
        path: &str,
        handler: BoxedHandler,
    ) -> Result<(), Error> {
        if let Ok(found) = self.tree.at_mut(path) {
            if found.value.iter().any(|(m, _)| *m == method) {
                return Err(Error::RouteConflict { method, path: path.to_owned() });
            }
            found.value.push((method, handler));
            return Ok(());
        }

        self.tree
            .insert(escape(path), vec![(method, handler)])
            .map_err(|source| Error::InvalidRoute { route: path.to_owned(), source })
    }

    pub(crate) fn lookup(&self, method: &Method, path: &str) -> Lookup {
        let Ok(found) = self.tree.at(path) else {
            return Lookup::NotFound;
        };
        match found.value.iter().find(|(m, _)| m == method) {
            Some((_, handler)) => Lookup::Found(Arc::clone(handler)),
            None => Lookup::MethodNotAllowed(found.value.iter().map(|(m, _)| m.clone()).collect()),
        }
    }
}

fn escape(path: &str) -> String {
    path.replace('{', "{{").replace('}', "}}")
}
