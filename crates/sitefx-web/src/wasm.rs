//! `wasm-bindgen` exports for the scroll lock and the transition mask.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CustomEvent, Document, Element, HtmlElement, Node, Response, ScrollToOptions, Window};

use sitefx_core::frame::FrameClock;
use sitefx_core::motion::Rect;
use sitefx_core::navigation::{parse_page, same_content, LinkClick, Navigator, MASK_CLASS};
use sitefx_core::page::{
    ContentSource, FeatureSection, MaskPhase, MaskSurface, PageContent, PageHost, Point,
    ScrollBehavior, ScrollPort, VertexId,
};
use sitefx_core::scroll_lock::{InputEvent, ScrollLockTabController};
use sitefx_core::transition::TransitionMaskAnimator;
use sitefx_core::{AppConfig, Error, Result};
use url::Url;

use crate::resize::ResizeTracker;
use crate::selectors;

fn console_error(message: &str) {
    let global = js_sys::global();
    if let Ok(console) = Reflect::get(&global, &"console".into()) {
        if let Ok(error) = Reflect::get(&console, &"error".into()) {
            if let Ok(f) = error.dyn_into::<js_sys::Function>() {
                let _ = f.call1(&console, &JsValue::from_str(message));
            }
        }
    }
}

fn install_panic_hook() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| console_error(&format!("{info}"))));
    });
}

/// Parse an optional TOML override, falling back to defaults
fn load_config(toml: Option<String>) -> AppConfig {
    match toml {
        Some(text) => AppConfig::from_toml(&text).unwrap_or_else(|e| {
            console_error(&format!("sitefx: {e}; using defaults"));
            AppConfig::default()
        }),
        None => AppConfig::default(),
    }
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn rect_of(element: &Element) -> Rect {
    let r = element.get_bounding_client_rect();
    Rect::new(r.top(), r.height())
}

fn set_class(element: &Element, class: &str, on: bool) {
    let _ = element.class_list().toggle_with_force(class, on);
}

fn window_dimension(value: std::result::Result<JsValue, JsValue>) -> f64 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

/// The live feature section
struct DomFeatureSection {
    window: Window,
    section: Element,
    wrapper: Element,
    tabs: Vec<Element>,
    panels: Vec<Element>,
}

impl DomFeatureSection {
    fn find(window: Window) -> Option<Self> {
        let document = window.document()?;
        let section = document.query_selector(selectors::FEATURE_SECTION).ok()??;
        let wrapper = document.query_selector(selectors::STICKY_WRAPPER).ok()??;
        let tabs = query_all(&document, selectors::FEATURE_TAB);
        let panels = query_all(&document, selectors::TAB_PANEL);
        Some(Self {
            window,
            section,
            wrapper,
            tabs,
            panels,
        })
    }
}

impl ScrollPort for DomFeatureSection {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        window_dimension(self.window.inner_height())
    }

    fn viewport_width(&self) -> f64 {
        window_dimension(self.window.inner_width())
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match behavior {
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}

impl FeatureSection for DomFeatureSection {
    fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    fn panel_count(&self) -> usize {
        self.panels.len()
    }

    fn section_rect(&self) -> Rect {
        rect_of(&self.section)
    }

    fn wrapper_rect(&self) -> Rect {
        rect_of(&self.wrapper)
    }

    fn set_wrapper_locked(&mut self, locked: bool) {
        set_class(&self.wrapper, selectors::POSITION_LOCKED, locked);
    }

    fn set_tab_active(&mut self, index: usize, active: bool) {
        if let Some(tab) = self.tabs.get(index) {
            set_class(tab, selectors::ACTIVE, active);
        }
    }

    fn set_panel_active(&mut self, index: usize, active: bool) {
        if let Some(panel) = self.panels.get(index) {
            set_class(panel, selectors::ACTIVE, active);
        }
    }
}

/// Scroll-locked feature tabs for the current page view
#[wasm_bindgen]
pub struct ScrollLockHandle {
    inner: Option<ScrollLockTabController<DomFeatureSection>>,
    config: AppConfig,
}

#[wasm_bindgen]
impl ScrollLockHandle {
    /// Attach to the feature section, if the page has one.
    ///
    /// `bypass_requested` is set when the user followed an in-page link to a
    /// section below the features.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>, bypass_requested: bool) -> Self {
        install_panic_hook();
        let config = load_config(config);

        let inner = web_sys::window().and_then(|window| {
            let hash = window.location().hash().unwrap_or_default();
            let fragment = hash.strip_prefix('#').filter(|f| !f.is_empty());
            let bypass = config.scroll_lock.bypass_for(fragment, bypass_requested);
            let dom = DomFeatureSection::find(window)?;
            ScrollLockTabController::attach(dom, &config.scroll_lock, bypass)
        });

        Self { inner, config }
    }

    #[wasm_bindgen(js_name = isAttached)]
    pub fn is_attached(&self) -> bool {
        self.inner.is_some()
    }

    /// Whether following `href` should skip the lock on the next attach
    #[wasm_bindgen(js_name = bypassesLock)]
    pub fn bypasses_lock(&self, href: &str) -> bool {
        self.config.scroll_lock.is_downstream_anchor(href)
    }

    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(&mut self) {
        if let Some(tabs) = &mut self.inner {
            tabs.on_scroll();
        }
    }

    #[wasm_bindgen(js_name = onFrame)]
    pub fn on_frame(&mut self, now: f64) {
        if let Some(tabs) = &mut self.inner {
            tabs.on_frame(now);
        }
    }

    /// Returns true if the caller must `preventDefault()` the event
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        self.input(InputEvent::Wheel { delta_y })
    }

    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&mut self, y: f64) -> bool {
        self.input(InputEvent::TouchStart { y })
    }

    #[wasm_bindgen(js_name = touchMove)]
    pub fn touch_move(&mut self, y: f64) -> bool {
        self.input(InputEvent::TouchMove { y })
    }

    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key_code: u32) -> bool {
        self.input(InputEvent::KeyDown { key_code })
    }

    #[wasm_bindgen(js_name = selectTab)]
    pub fn select_tab(&mut self, index: usize) {
        if let Some(tabs) = &mut self.inner {
            tabs.select_tab(index);
        }
    }

    pub fn phase(&self) -> String {
        self.inner
            .as_ref()
            .map(|tabs| tabs.session().phase().name().to_string())
            .unwrap_or_else(|| "detached".to_string())
    }

    #[wasm_bindgen(js_name = currentTab)]
    pub fn current_tab(&self) -> usize {
        self.inner
            .as_ref()
            .map(|tabs| tabs.session().current_tab())
            .unwrap_or(0)
    }

    /// Release the section before the page content is replaced
    pub fn detach(&mut self) {
        if let Some(tabs) = self.inner.take() {
            tabs.detach();
        }
    }

    fn input(&mut self, event: InputEvent) -> bool {
        self.inner
            .as_mut()
            .map(|tabs| tabs.handle_input(event).prevent_default)
            .unwrap_or(false)
    }
}

/// The transition mask element
struct DomMask {
    element: HtmlElement,
}

impl DomMask {
    /// Reuse the page's mask or append a fresh one to `<body>`
    fn attach(document: &Document) -> Option<Self> {
        let selector = format!(".{MASK_CLASS}");
        if let Ok(Some(existing)) = document.query_selector(&selector) {
            return existing.dyn_into::<HtmlElement>().ok().map(|element| Self { element });
        }

        let element = document.create_element("div").ok()?;
        element.set_class_name(&format!("{MASK_CLASS} revealed"));
        document.body()?.append_child(&element).ok()?;
        element.dyn_into::<HtmlElement>().ok().map(|element| Self { element })
    }
}

impl MaskSurface for DomMask {
    fn set_vertex(&mut self, vertex: VertexId, position: Point) {
        let style = self.element.style();
        let name = vertex.css_name();
        let _ = style.set_property(&format!("--{name}X"), &format!("{}%", position.x));
        let _ = style.set_property(&format!("--{name}Y"), &format!("{}%", position.y));
    }

    fn set_phase(&mut self, phase: MaskPhase) {
        let classes = self.element.class_list();
        for class in selectors::MASK_PHASE_CLASSES {
            let _ = classes.toggle_with_force(class, phase.classes().contains(&class));
        }
    }
}

fn js_error(value: JsValue) -> Error {
    Error::Host(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

fn now_ms(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

/// Frame timestamps from `requestAnimationFrame`
struct RafClock {
    window: Window,
}

#[async_trait(?Send)]
impl FrameClock for RafClock {
    async fn next_frame(&self) -> f64 {
        let window = self.window.clone();
        let frame = Promise::new(&mut |resolve, _reject| {
            if window.request_animation_frame(&resolve).is_err() {
                let _ = resolve.call0(&JsValue::UNDEFINED);
            }
        });
        JsFuture::from(frame)
            .await
            .ok()
            .and_then(|timestamp| timestamp.as_f64())
            .unwrap_or_else(|| now_ms(&self.window))
    }
}

/// Page markup over `window.fetch`
struct FetchContentSource {
    window: Window,
}

#[async_trait(?Send)]
impl ContentSource for FetchContentSource {
    async fn fetch(&self, url: &Url) -> Result<PageContent> {
        let response: Response = JsFuture::from(self.window.fetch_with_str(url.as_str()))
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(js_error)?;
        if !response.ok() {
            return Err(Error::ContentStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?;
        let html = text
            .as_string()
            .ok_or_else(|| Error::Markup("response body is not text".to_string()))?;
        parse_page(&html)
    }
}

/// Swap title and body children, leaving the mask where it is
fn replace_page(document: &Document, mask: &Node, content: &PageContent) -> Result<()> {
    let body = document
        .body()
        .ok_or_else(|| Error::Host("document has no body".to_string()))?;
    document.set_title(&content.title);

    let children = body.children();
    let stale: Vec<Element> = (0..children.length())
        .filter_map(|i| children.item(i))
        .filter(|child| !child.is_same_node(Some(mask)))
        .collect();
    for child in stale {
        child.remove();
    }

    body.insert_adjacent_html("beforeend", &content.body)
        .map_err(js_error)
}

/// Call `target[name]()` if the page defines it; failures are logged, not raised
fn call_page_hook(target: &JsValue, name: &str) {
    let Some(hook) = Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
    else {
        return;
    };
    if let Err(e) = hook.call0(target) {
        console_error(&format!("sitefx: {name} failed: {e:?}"));
    }
}

fn session_flag(window: &Window) -> Option<web_sys::Storage> {
    window.session_storage().ok().flatten()
}

/// Document, history and session storage of the live page
struct DomHost {
    window: Window,
    document: Document,
    mask: Node,
}

#[async_trait(?Send)]
impl PageHost for DomHost {
    fn supports_view_transition(&self) -> bool {
        Reflect::has(&self.document, &JsValue::from_str("startViewTransition")).unwrap_or(false)
    }

    async fn swap_with_view_transition(&mut self, content: PageContent) -> Result<()> {
        let start = Reflect::get(&self.document, &JsValue::from_str("startViewTransition"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| Error::Unsupported("document.startViewTransition".to_string()))?;

        let failure: Rc<RefCell<Option<Error>>> = Rc::default();
        let update = {
            let document = self.document.clone();
            let mask = self.mask.clone();
            let failure = Rc::clone(&failure);
            Closure::once_into_js(move || {
                if let Err(e) = replace_page(&document, &mask, &content) {
                    *failure.borrow_mut() = Some(e);
                }
            })
        };

        let transition = start
            .call1(&self.document, &update)
            .map_err(|_| Error::Unsupported("document.startViewTransition".to_string()))?;
        let finished: Promise = Reflect::get(&transition, &JsValue::from_str("finished"))
            .map_err(js_error)?
            .dyn_into()
            .map_err(js_error)?;
        let settled = JsFuture::from(finished).await;

        let swap_failed = failure.borrow_mut().take();
        match swap_failed {
            Some(e) => Err(e),
            None => settled.map(|_| ()).map_err(js_error),
        }
    }

    fn swap_content(&mut self, content: &PageContent) -> Result<()> {
        replace_page(&self.document, &self.mask, content)
    }

    fn push_history(&mut self, url: &Url) {
        let pushed = self
            .window
            .history()
            .and_then(|h| h.push_state_with_url(&JsValue::NULL, "", Some(url.as_str())));
        if let Err(e) = pushed {
            console_error(&format!("sitefx: pushState failed: {e:?}"));
        }
    }

    fn scroll_to_top(&mut self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }

    fn reinitialize(&mut self) -> Result<()> {
        if let Ok(controller) = Reflect::get(&self.window, &JsValue::from_str("AnimationController")) {
            if controller.is_object() {
                call_page_hook(&controller, "cleanup");
            }
        }
        for hook in selectors::REINIT_HOOKS {
            call_page_hook(&self.window, hook);
        }

        let event = CustomEvent::new(selectors::TRANSITION_COMPLETE_EVENT).map_err(js_error)?;
        self.window.dispatch_event(&event).map_err(js_error)?;
        Ok(())
    }

    fn set_navigating_marker(&mut self, navigating: bool) {
        if let Some(storage) = session_flag(&self.window) {
            let _ = if navigating {
                storage.set_item(selectors::NAVIGATING_KEY, "true")
            } else {
                storage.remove_item(selectors::NAVIGATING_KEY)
            };
        }
    }

    fn hard_navigate(&mut self, url: &Url) {
        if let Err(e) = self.window.location().assign(url.as_str()) {
            console_error(&format!("sitefx: full page load failed: {e:?}"));
        }
    }
}

type DomNavigator = Navigator<FetchContentSource, DomHost, DomMask, RafClock>;

fn build_navigator(config: &AppConfig) -> Option<DomNavigator> {
    let window = web_sys::window()?;
    let document = window.document()?;
    let current = Url::parse(&window.location().href().ok()?).ok()?;
    let width = window_dimension(window.inner_width());

    let mask = DomMask::attach(&document)?;
    let host = DomHost {
        window: window.clone(),
        document,
        mask: mask.element.clone().into(),
    };
    let animator = TransitionMaskAnimator::new(mask, config.transition.clone(), width);
    let source = FetchContentSource {
        window: window.clone(),
    };
    Some(Navigator::new(source, host, animator, RafClock { window }, current))
}

/// Page transitions: the mask, link interception and the navigation pipeline
#[wasm_bindgen]
pub struct TransitionHandle {
    navigator: Option<DomNavigator>,
    resize: RefCell<ResizeTracker>,
}

#[wasm_bindgen]
impl TransitionHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Self {
        install_panic_hook();
        let config = load_config(config);

        let navigator = build_navigator(&config);
        if navigator.is_none() {
            console_error("sitefx: no document to attach the transition mask to");
        }

        Self {
            navigator,
            resize: RefCell::new(ResizeTracker::new()),
        }
    }

    /// Settle the mask for this page load.
    ///
    /// `back_forward` is true when the browser reports a history traversal;
    /// a marker left by a fallen-back transition also counts as arriving.
    #[wasm_bindgen(js_name = onPageLoad)]
    pub async fn on_page_load(&self, back_forward: bool) {
        let Some(navigator) = &self.navigator else {
            return;
        };
        let marked = web_sys::window()
            .as_ref()
            .and_then(session_flag)
            .and_then(|storage| storage.get_item(selectors::NAVIGATING_KEY).ok().flatten())
            .is_some_and(|value| value == "true");
        navigator.on_page_load(back_forward || marked).await;
    }

    /// Animated navigation to `url`; resolves to the outcome name
    pub async fn navigate(&self, url: String, push_state: bool) -> std::result::Result<String, JsValue> {
        let Some(navigator) = &self.navigator else {
            return Err(JsValue::from_str("sitefx: transition handle is detached"));
        };
        let target = navigator
            .current_url()
            .join(&url)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        if let Some(width) = self.resize.borrow_mut().take_pending() {
            navigator.set_viewport_width(width);
        }
        Ok(navigator.navigate(target, push_state).await.name().to_string())
    }

    /// `popstate`: the address bar already shows the target
    #[wasm_bindgen(js_name = onPopState)]
    pub async fn on_pop_state(&self) -> std::result::Result<String, JsValue> {
        let Some(navigator) = &self.navigator else {
            return Err(JsValue::from_str("sitefx: transition handle is detached"));
        };
        let href = web_sys::window()
            .ok_or_else(|| JsValue::from_str("sitefx: no window"))?
            .location()
            .href()?;
        let target = Url::parse(&href).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(navigator.on_history_pop(target).await.name().to_string())
    }

    /// Absolute URL to navigate to in place, or `undefined` to let the browser follow the link
    #[wasm_bindgen(js_name = interceptLink)]
    pub fn intercept_link(
        &self,
        href: &str,
        target: Option<String>,
        ctrl: bool,
        meta: bool,
        shift: bool,
    ) -> Option<String> {
        let link = LinkClick {
            href: href.to_string(),
            target,
            ctrl,
            meta,
            shift,
        };
        self.navigator
            .as_ref()?
            .intercept(&link)
            .map(String::from)
    }

    #[wasm_bindgen(js_name = isInFlight)]
    pub fn is_in_flight(&self) -> bool {
        self.navigator.as_ref().is_some_and(|n| n.is_in_flight())
    }

    /// Throttled viewport re-evaluation; a running transition keeps its timing
    #[wasm_bindgen(js_name = onResize)]
    pub fn on_resize(&self, width: f64, now: f64) {
        let Some(navigator) = &self.navigator else {
            return;
        };
        if let Some(width) = self.resize.borrow_mut().observe(width, now) {
            navigator.set_viewport_width(width);
        }
    }

    #[wasm_bindgen(js_name = sameContent)]
    pub fn same_content(a: &str, b: &str) -> bool {
        same_content(a, b)
    }
}
