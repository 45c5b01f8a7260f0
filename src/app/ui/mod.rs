mod panels;
mod tooltip;

pub(super) use tooltip::TooltipOverlay;
