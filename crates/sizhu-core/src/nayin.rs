//! Sound elements (纳音). Each consecutive pair of the 60-term cycle shares
//! one named label, and the label embeds its element.

use serde::{Deserialize, Serialize};

use crate::cycle::GanZhi;
use crate::symbols::Element;

const NAMES: [&str; 30] = [
    "海中金", "炉中火", "大林木", "路旁土", "剑锋金", "山头火", "涧下水", "城头土", "白蜡金", "杨柳木",
    "泉中水", "屋上土", "霹雳火", "松柏木", "长流水", "砂中金", "山下火", "平地木", "壁上土", "金箔金",
    "覆灯火", "天河水", "大驿土", "钗钏金", "桑柘木", "大溪水", "沙中土", "天上火", "石榴木", "大海水",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundElement {
    pub name: String,
    pub element: Element,
}

/// `None` for pairs outside the 60-term cycle.
pub fn sound_element(ganzhi: &GanZhi) -> Option<SoundElement> {
    let name = NAMES[ganzhi.cycle_index()? / 2];
    let element = Element::embedded_in(name)?;
    Some(SoundElement {
        name: name.to_string(),
        element,
    })
}
