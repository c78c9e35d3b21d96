//! Keeps one [`ContentViewController`] per open tab.
//!
//! Views are not torn down when they go to the background. A tab's view is
//! created with the tab, released when the tab closes, and only rendered the
//! first time the tab is shown.

use std::collections::HashMap;
use std::sync::Arc;

use crate::managers::tab_store::{StoreHandle, TabStoreTrait};
use crate::services::oembed_client::MetadataLookup;
use crate::types::settings::NavigationSettings;
use crate::view::content_surface::SurfaceFactory;
use crate::view::view_controller::ContentViewController;

pub struct ViewHost<F: SurfaceFactory, L: MetadataLookup> {
    store: StoreHandle,
    factory: Arc<F>,
    lookup: Arc<L>,
    nav: NavigationSettings,
    controllers: HashMap<String, ContentViewController<F, L>>,
}

impl<F: SurfaceFactory, L: MetadataLookup> ViewHost<F, L> {
    pub fn new(store: StoreHandle, factory: Arc<F>, lookup: Arc<L>, nav: NavigationSettings) -> Self {
        let mut host = Self {
            store,
            factory,
            lookup,
            nav,
            controllers: HashMap::new(),
        };
        host.sync();
        host
    }

    /// Reconciles controllers with the store: drops views of closed tabs,
    /// creates views for new tabs and moves the active flag.
    pub fn sync(&mut self) {
        let (ids, active) = self.store.read(|s| {
            let ids: Vec<String> = s.tabs().iter().map(|t| t.id.clone()).collect();
            (ids, s.active_tab_id().map(str::to_string))
        });

        let before = self.controllers.len();
        self.controllers.retain(|id, _| ids.contains(id));
        let released = before - self.controllers.len();
        if released > 0 {
            log::debug!("Released {} closed tab view(s)", released);
        }

        for id in &ids {
            if !self.controllers.contains_key(id) {
                let controller = ContentViewController::new(
                    id,
                    self.store.clone(),
                    Arc::clone(&self.factory),
                    Arc::clone(&self.lookup),
                    self.nav.clone(),
                );
                self.controllers.insert(id.clone(), controller);
            }
        }

        // Deactivate first so only one view ever reports as active.
        for (id, controller) in self.controllers.iter_mut() {
            if controller.is_active() && active.as_deref() != Some(id.as_str()) {
                controller.set_active(false);
            }
        }
        if let Some(controller) = active.as_ref().and_then(|id| self.controllers.get_mut(id)) {
            controller.set_active(true);
        }
    }

    /// Applies changed navigation settings to every view, present and future.
    pub fn set_navigation_settings(&mut self, nav: NavigationSettings) {
        for controller in self.controllers.values_mut() {
            controller.set_navigation_settings(nav.clone());
        }
        self.nav = nav;
    }

    /// Lets every controller consume pending navigation signals. Returns the
    /// number of commands executed.
    pub fn dispatch_navigation(&mut self) -> usize {
        self.controllers
            .values_mut()
            .map(|c| c.process_navigation())
            .sum()
    }

    /// Drains queued surface events of every rendered view.
    pub async fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        for controller in self.controllers.values_mut() {
            handled += controller.pump().await;
        }
        handled
    }

    pub fn controller(&self, tab_id: &str) -> Option<&ContentViewController<F, L>> {
        self.controllers.get(tab_id)
    }

    pub fn controller_mut(&mut self, tab_id: &str) -> Option<&mut ContentViewController<F, L>> {
        self.controllers.get_mut(tab_id)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Ids of tabs whose surface has been created.
    pub fn rendered(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .controllers
            .values()
            .filter(|c| c.surface().is_some())
            .map(|c| c.tab_id().to_string())
            .collect();
        ids.sort();
        ids
    }
}
