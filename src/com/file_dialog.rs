#![allow(non_snake_case, non_camel_case_types, non_upper_case_globals)]

use std::ffi::c_void;
use std::path::Path;

use windows_sys::Win32::System::Com::{
    CLSCTX_ALL, COINIT_APARTMENTTHREADED, CoCreateInstance, CoInitializeEx, CoTaskMemFree,
};
use windows_sys::Win32::UI::Shell::SHCreateItemFromParsingName;
use windows_sys::core::GUID;

use crate::utils::{from_wstring_ptr, to_wstring};

pub type HRESULT = i32;
pub type PCWSTR = *const u16;

// --- GUID Definitions ---
const CLSID_FILE_OPEN_DIALOG: GUID = GUID { data1: 0xDC1C5A9C, data2: 0xE88A, data3: 0x4DDE, data4: [0xA5, 0xA1, 0x60, 0xF8, 0x2A, 0x20, 0xAE, 0xF7] };
const IID_IFILE_OPEN_DIALOG: GUID = GUID { data1: 0xd57c7288, data2: 0xd4ad, data3: 0x4768, data4: [0xbe, 0x02, 0x9d, 0x96, 0x95, 0x32, 0xd9, 0x60] };
const CLSID_FILE_SAVE_DIALOG: GUID = GUID { data1: 0xC0B4E2F3, data2: 0xBA21, data3: 0x4773, data4: [0x8D, 0xBA, 0x33, 0x5E, 0xC9, 0x46, 0xEB, 0x8B] };
const IID_IFILE_SAVE_DIALOG: GUID = GUID { data1: 0x84bccd23, data2: 0x5fde, data3: 0x4cdb, data4: [0xae, 0xa4, 0xaf, 0x64, 0xb8, 0x3d, 0x78, 0xab] };
const IID_ISHELL_ITEM: GUID = GUID { data1: 0x43826d1e, data2: 0xe718, data3: 0x42ee, data4: [0xbc, 0x55, 0xa1, 0xe2, 0x61, 0xc3, 0x7b, 0xfe] };

// --- Constants ---
const FOS_OVERWRITEPROMPT: u32 = 0x2;
const FOS_PICKFOLDERS: u32 = 0x20;
const FOS_FORCEFILESYSTEM: u32 = 0x40;
const FOS_ALLOWMULTISELECT: u32 = 0x200;
const SIGDN_FILESYSPATH: u32 = 0x80058000;
// User pressed Cancel: HRESULT_FROM_WIN32(ERROR_CANCELLED)
const HR_CANCELLED: HRESULT = 0x800704C7u32 as i32;

#[repr(C)]
struct COMDLG_FILTERSPEC {
    pszName: PCWSTR,
    pszSpec: PCWSTR,
}

// --- COM VTable Definitions ---

// Common IFileDialog layout, shared by the open and save dialogs.
#[repr(C)]
pub struct IFileDialogVtbl {
    pub query_interface: unsafe extern "system" fn(*mut c_void, *const GUID, *mut *mut c_void) -> HRESULT,
    pub add_ref: unsafe extern "system" fn(*mut c_void) -> u32,
    pub release: unsafe extern "system" fn(*mut c_void) -> u32,
    pub show: unsafe extern "system" fn(*mut c_void, isize) -> HRESULT,
    pub set_file_types: unsafe extern "system" fn(*mut c_void, u32, *const c_void) -> HRESULT,
    pub set_file_type_index: unsafe extern "system" fn(*mut c_void, u32) -> HRESULT,
    pub get_file_type_index: unsafe extern "system" fn(*mut c_void, *mut u32) -> HRESULT,
    pub advise: unsafe extern "system" fn(*mut c_void, *mut c_void, *mut u32) -> HRESULT,
    pub unadvise: unsafe extern "system" fn(*mut c_void, u32) -> HRESULT,
    pub set_options: unsafe extern "system" fn(*mut c_void, u32) -> HRESULT,
    pub get_options: unsafe extern "system" fn(*mut c_void, *mut u32) -> HRESULT,
    pub set_default_folder: unsafe extern "system" fn(*mut c_void, *mut c_void) -> HRESULT,
    pub set_folder: unsafe extern "system" fn(*mut c_void, *mut c_void) -> HRESULT,
    pub get_folder: unsafe extern "system" fn(*mut c_void, *mut *mut c_void) -> HRESULT,
    pub get_current_selection: unsafe extern "system" fn(*mut c_void, *mut *mut c_void) -> HRESULT,
    pub set_file_name: unsafe extern "system" fn(*mut c_void, PCWSTR) -> HRESULT,
    pub get_file_name: unsafe extern "system" fn(*mut c_void, *mut PCWSTR) -> HRESULT,
    pub set_title: unsafe extern "system" fn(*mut c_void, PCWSTR) -> HRESULT,
    pub set_ok_button_label: unsafe extern "system" fn(*mut c_void, PCWSTR) -> HRESULT,
    pub set_file_name_label: unsafe extern "system" fn(*mut c_void, PCWSTR) -> HRESULT,
    pub get_result: unsafe extern "system" fn(*mut c_void, *mut *mut c_void) -> HRESULT,
    pub add_place: unsafe extern "system" fn(*mut c_void, *mut c_void, u32) -> HRESULT,
    pub set_default_extension: unsafe extern "system" fn(*mut c_void, PCWSTR) -> HRESULT,
    pub close: unsafe extern "system" fn(*mut c_void, HRESULT) -> HRESULT,
    pub set_client_guid: unsafe extern "system" fn(*mut c_void, *const GUID) -> HRESULT,
    pub clear_client_data: unsafe extern "system" fn(*mut c_void) -> HRESULT,
    pub set_filter: unsafe extern "system" fn(*mut c_void, *mut c_void) -> HRESULT,
}

// IFileOpenDialog appends the multi-selection getters.
#[repr(C)]
pub struct IFileOpenDialogVtbl {
    pub base: IFileDialogVtbl,
    pub get_results: unsafe extern "system" fn(*mut c_void, *mut *mut c_void) -> HRESULT,
    pub get_selected_items: unsafe extern "system" fn(*mut c_void, *mut *mut c_void) -> HRESULT,
}

#[repr(C)]
pub struct IShellItemVtbl {
    pub query_interface: unsafe extern "system" fn(*mut c_void, *const GUID, *mut *mut c_void) -> HRESULT,
    pub add_ref: unsafe extern "system" fn(*mut c_void) -> u32,
    pub release: unsafe extern "system" fn(*mut c_void) -> u32,
    pub bind_to_handler: unsafe extern "system" fn(*mut c_void, *mut c_void, *const GUID, *const GUID, *mut *mut c_void) -> HRESULT,
    pub get_parent: unsafe extern "system" fn(*mut c_void, *mut *mut c_void) -> HRESULT,
    pub get_display_name: unsafe extern "system" fn(*mut c_void, u32, *mut PCWSTR) -> HRESULT,
    pub get_attributes: unsafe extern "system" fn(*mut c_void, u32, *mut u32) -> HRESULT,
    pub compare: unsafe extern "system" fn(*mut c_void, *mut c_void, u32, *mut i32) -> HRESULT,
}

#[repr(C)]
pub struct IShellItemArrayVtbl {
    pub query_interface: unsafe extern "system" fn(*mut c_void, *const GUID, *mut *mut c_void) -> HRESULT,
    pub add_ref: unsafe extern "system" fn(*mut c_void) -> u32,
    pub release: unsafe extern "system" fn(*mut c_void) -> u32,
    pub bind_to_handler: unsafe extern "system" fn(*mut c_void, *mut c_void, *const GUID, *const GUID, *mut *mut c_void) -> HRESULT,
    pub get_property_store: unsafe extern "system" fn(*mut c_void, u32, *const GUID, *mut *mut c_void) -> HRESULT,
    pub get_property_description_list: unsafe extern "system" fn(*mut c_void, *const GUID, *const GUID, *mut *mut c_void) -> HRESULT,
    pub get_attributes: unsafe extern "system" fn(*mut c_void, u32, u32, *mut c_void) -> HRESULT,
    pub get_count: unsafe extern "system" fn(*mut c_void, *mut u32) -> HRESULT,
    pub get_item_at: unsafe extern "system" fn(*mut c_void, u32, *mut *mut c_void) -> HRESULT,
    pub enum_items: unsafe extern "system" fn(*mut c_void, *mut *mut c_void) -> HRESULT,
}

// The dialogs need an apartment; repeated/concurrent init results
// (S_FALSE, RPC_E_CHANGED_MODE) are fine to ignore.
fn ensure_com() {
    unsafe {
        let _ = CoInitializeEx(std::ptr::null(), COINIT_APARTMENTTHREADED);
    }
}

/// Helper to extract a filesystem path string from an IShellItem pointer.
/// Handles GetDisplayName, string conversion, and CoTaskMemFree.
unsafe fn shell_item_path(p_item: *mut c_void) -> Option<String> { unsafe {
    let item = p_item as *mut *mut IShellItemVtbl;
    let item_vtbl = (*item).as_ref().unwrap();

    let mut name_ptr: PCWSTR = std::ptr::null();
    if (item_vtbl.get_display_name)(p_item, SIGDN_FILESYSPATH, &mut name_ptr) == 0 && !name_ptr.is_null() {
        let result = from_wstring_ptr(name_ptr);
        CoTaskMemFree(name_ptr as *const _);
        return Some(result);
    }
    None
}}

// Resolve a path string to an IShellItem for SetFolder. None when the path
// does not resolve (dialog then opens at its default location).
unsafe fn folder_item(path: &str) -> Option<*mut c_void> { unsafe {
    if path.is_empty() {
        return None;
    }
    let wide = to_wstring(path);
    let mut p_item: *mut c_void = std::ptr::null_mut();
    let hr = SHCreateItemFromParsingName(wide.as_ptr(), std::ptr::null_mut(), &IID_ISHELL_ITEM, &mut p_item);
    if hr == 0 && !p_item.is_null() {
        Some(p_item)
    } else {
        None
    }
}}

unsafe fn release_item(p_item: *mut c_void) { unsafe {
    let item = p_item as *mut *mut IShellItemVtbl;
    ((*item).as_ref().unwrap().release)(p_item);
}}

// Shared configuration: title, start folder, filter, extra FOS flags.
// Returns the filter's wide-string buffers; the caller must keep them
// alive until Show has returned.
unsafe fn configure(
    p_dialog: *mut c_void,
    vtbl: &IFileDialogVtbl,
    title: &str,
    default_folder: &str,
    filter: &str,
    options_flags: u32,
) -> Option<(Vec<u16>, Vec<u16>)> { unsafe {
    let mut current_options = 0;
    (vtbl.get_options)(p_dialog, &mut current_options);
    (vtbl.set_options)(p_dialog, current_options | FOS_FORCEFILESYSTEM | options_flags);

    let wtitle = to_wstring(title);
    (vtbl.set_title)(p_dialog, wtitle.as_ptr());

    if let Some(p_folder) = folder_item(default_folder) {
        (vtbl.set_folder)(p_dialog, p_folder);
        release_item(p_folder);
    }

    if filter.is_empty() {
        return None;
    }
    let wname = to_wstring(filter);
    let wspec = to_wstring(filter);
    let spec = COMDLG_FILTERSPEC {
        pszName: wname.as_ptr(),
        pszSpec: wspec.as_ptr(),
    };
    (vtbl.set_file_types)(p_dialog, 1, &spec as *const _ as *const c_void);
    Some((wname, wspec))
}}

/// Pick one or more existing files with the native IFileOpenDialog.
/// Returns an empty vector when the user cancels.
pub unsafe fn open_files(
    title: &str,
    default_path: &str,
    filter: &str,
    multiselect: bool,
) -> Result<Vec<String>, HRESULT> { unsafe {
    let extra = if multiselect { FOS_ALLOWMULTISELECT } else { 0 };
    run_open_dialog(title, default_path, filter, extra)
}}

/// Pick a single folder (IFileOpenDialog in folder mode).
pub unsafe fn select_folder(title: &str, default_path: &str) -> Result<Vec<String>, HRESULT> { unsafe {
    run_open_dialog(title, default_path, "", FOS_PICKFOLDERS)
}}

unsafe fn run_open_dialog(
    title: &str,
    default_path: &str,
    filter: &str,
    options_flags: u32,
) -> Result<Vec<String>, HRESULT> { unsafe {
    ensure_com();

    let mut p_dialog: *mut c_void = std::ptr::null_mut();
    let hr = CoCreateInstance(&CLSID_FILE_OPEN_DIALOG, std::ptr::null_mut(), CLSCTX_ALL, &IID_IFILE_OPEN_DIALOG, &mut p_dialog);
    if hr != 0 {
        return Err(hr);
    }

    let dialog = p_dialog as *mut *mut IFileOpenDialogVtbl;
    let vtbl = (*dialog).as_ref().unwrap();

    let _filter_keepalive = configure(p_dialog, &vtbl.base, title, default_path, filter, options_flags);

    let hr = (vtbl.base.show)(p_dialog, 0);
    if hr != 0 {
        (vtbl.base.release)(p_dialog);
        return if hr == HR_CANCELLED { Ok(Vec::new()) } else { Err(hr) };
    }

    let mut p_results: *mut c_void = std::ptr::null_mut();
    let hr = (vtbl.get_results)(p_dialog, &mut p_results);
    if hr != 0 {
        (vtbl.base.release)(p_dialog);
        return Err(hr);
    }

    let results = p_results as *mut *mut IShellItemArrayVtbl;
    let results_vtbl = (*results).as_ref().unwrap();

    let mut count = 0;
    (results_vtbl.get_count)(p_results, &mut count);

    let mut paths = Vec::with_capacity(count as usize);
    for i in 0..count {
        let mut p_item: *mut c_void = std::ptr::null_mut();
        if (results_vtbl.get_item_at)(p_results, i, &mut p_item) == 0 {
            if let Some(path) = shell_item_path(p_item) {
                paths.push(path);
            }
            release_item(p_item);
        }
    }

    (results_vtbl.release)(p_results);
    (vtbl.base.release)(p_dialog);

    Ok(paths)
}}

/// Pick a destination path with the native IFileSaveDialog. Returns an
/// empty vector when the user cancels.
pub unsafe fn save_file(title: &str, default_path: &str, filter: &str) -> Result<Vec<String>, HRESULT> { unsafe {
    ensure_com();

    let mut p_dialog: *mut c_void = std::ptr::null_mut();
    let hr = CoCreateInstance(&CLSID_FILE_SAVE_DIALOG, std::ptr::null_mut(), CLSCTX_ALL, &IID_IFILE_SAVE_DIALOG, &mut p_dialog);
    if hr != 0 {
        return Err(hr);
    }

    let dialog = p_dialog as *mut *mut IFileDialogVtbl;
    let vtbl = (*dialog).as_ref().unwrap();

    // Split "dir/name.ext" so the dialog starts in dir with name pre-filled.
    let (folder, file_name) = split_default_path(default_path);
    let _filter_keepalive = configure(p_dialog, vtbl, title, folder, filter, FOS_OVERWRITEPROMPT);
    if !file_name.is_empty() {
        let wname = to_wstring(file_name);
        (vtbl.set_file_name)(p_dialog, wname.as_ptr());
    }

    let hr = (vtbl.show)(p_dialog, 0);
    if hr != 0 {
        (vtbl.release)(p_dialog);
        return if hr == HR_CANCELLED { Ok(Vec::new()) } else { Err(hr) };
    }

    let mut p_item: *mut c_void = std::ptr::null_mut();
    let hr = (vtbl.get_result)(p_dialog, &mut p_item);
    if hr != 0 {
        (vtbl.release)(p_dialog);
        return Err(hr);
    }

    let path = shell_item_path(p_item);
    release_item(p_item);
    (vtbl.release)(p_dialog);

    Ok(path.into_iter().collect())
}}

fn split_default_path(default_path: &str) -> (&str, &str) {
    let path = Path::new(default_path);
    if default_path.is_empty() || default_path.ends_with(['\\', '/']) {
        return (default_path, "");
    }
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let folder = path.parent().and_then(|p| p.to_str()).unwrap_or("");
    (folder, file_name)
}
